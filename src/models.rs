use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

// amoCRM custom-field codes. Codes are the only join key that survives
// per-account field reconfiguration; ids and names do not.
pub const FIELD_EMAIL: &str = "EMAIL";
pub const FIELD_PHONE: &str = "PHONE";
pub const FIELD_UTM_SOURCE: &str = "UTM_SOURCE";
pub const FIELD_UTM_MEDIUM: &str = "UTM_MEDIUM";
pub const FIELD_UTM_CAMPAIGN: &str = "UTM_CAMPAIGN";
pub const FIELD_UTM_CONTENT: &str = "UTM_CONTENT";
pub const FIELD_UTM_TERM: &str = "UTM_TERM";
pub const FIELD_UTM_ID: &str = "UTM_ID";
pub const FIELD_FBCLID: &str = "FBCLID";
pub const FIELD_REFERER: &str = "REFERER";

/// amoCRM v4 lead. Fetched fresh per webhook, never cached across events,
/// and owned entirely by the pipeline run that fetched it.
#[derive(Debug, Clone, Deserialize)]
pub struct Lead {
    pub id: u64,

    /// Sale amount. Usually a JSON number, but kept raw because some
    /// account configurations deliver it as a formatted string.
    #[serde(default)]
    pub price: Option<Value>,

    /// Nullable in the wire format when the lead has no filled fields.
    #[serde(default)]
    pub custom_fields_values: Option<Vec<CustomField>>,

    #[serde(rename = "_embedded", default)]
    pub embedded: Option<LeadEmbedded>,
}

impl Lead {
    /// Price coerced to a number; absent or unparseable is `None`.
    pub fn price_value(&self) -> Option<f64> {
        match self.price.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Id of the first linked contact, if the lead has any.
    pub fn first_contact_id(&self) -> Option<u64> {
        self.embedded.as_ref()?.contacts.first().map(|c| c.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadEmbedded {
    #[serde(default)]
    pub contacts: Vec<ContactRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactRef {
    pub id: u64,
}

/// amoCRM v4 contact, fetched only when a lead references one.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub id: u64,

    #[serde(default)]
    pub custom_fields_values: Option<Vec<CustomField>>,
}

/// One entry of an entity's schema-less custom-field array. Every member
/// is optional on the wire; entries without a code are unreachable by
/// code-based lookup and therefore treated as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub field_id: Option<u64>,
    #[serde(default)]
    pub field_code: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldValue {
    /// String, number or boolean depending on the field type.
    #[serde(default)]
    pub value: Value,
}

/// Field-code → first-value lookup table, built once per fetched entity
/// instead of rescanning the array per access.
///
/// Lookup is by exact, case-sensitive code match; the first field carrying
/// a code wins, matching a linear scan over the wire order. Malformed
/// entries, empty value arrays and unknown codes all degrade to `None`:
/// enrichment never fails the pipeline over one missing attribute.
#[derive(Debug, Default)]
pub struct FieldMap(HashMap<String, Option<String>>);

impl FieldMap {
    pub fn from_fields(fields: Option<&[CustomField]>) -> Self {
        let mut map = HashMap::new();
        for field in fields.unwrap_or_default() {
            let Some(code) = field.field_code.as_deref() else {
                continue;
            };
            // A valueless first occurrence still claims the code, exactly
            // as a linear scan stopping at the first match would.
            let value = field.values.first().and_then(|v| value_as_string(&v.value));
            map.entry(code.to_string()).or_insert(value);
        }
        Self(map)
    }

    /// First value of the first field whose code matches `code`.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code)?.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.get(FIELD_EMAIL)
    }

    pub fn phone(&self) -> Option<&str> {
        self.get(FIELD_PHONE)
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Marketing attribution extracted from a lead's custom fields. Derived
/// per run, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AttributionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbclid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

impl AttributionData {
    pub fn from_fields(fields: &FieldMap) -> Self {
        let own = |code: &str| fields.get(code).map(str::to_string);
        Self {
            utm_source: own(FIELD_UTM_SOURCE),
            utm_medium: own(FIELD_UTM_MEDIUM),
            utm_campaign: own(FIELD_UTM_CAMPAIGN),
            utm_content: own(FIELD_UTM_CONTENT),
            utm_term: own(FIELD_UTM_TERM),
            utm_id: own(FIELD_UTM_ID),
            fbclid: own(FIELD_FBCLID),
            referer: own(FIELD_REFERER),
        }
    }
}
