use serde_json::Value;
use url::form_urlencoded;

/// Canonical status-change event decoded from an inbound amoCRM webhook.
///
/// Webhook payloads are partial and untrusted, so every field is optional.
/// Produced once per delivery and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusChangeEvent {
    pub lead_id: Option<u64>,
    pub status_id: Option<u64>,
    pub pipeline_id: Option<u64>,
    pub old_status_id: Option<u64>,
    pub account_id: Option<u64>,
    pub subdomain: Option<String>,
}

impl StatusChangeEvent {
    /// Decode a raw webhook body.
    ///
    /// Strict JSON is tried first; anything that does not parse as JSON
    /// (including an empty body) falls back to amoCRM's URL-encoded form
    /// layout. Decoding is total: the worst case is an event with every
    /// field absent, never an error.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::from_form(raw),
        }
    }

    /// Map a JSON body to the canonical event.
    ///
    /// amoCRM itself nests the change under `leads.status[0]`; re-posts
    /// from integration tooling use a flat object. Both are accepted, the
    /// flat key winning when present.
    fn from_json(json: &Value) -> Self {
        let status = json.pointer("/leads/status/0");
        let account = json.get("account");

        let id_field = |flat: &str, nested: &str| {
            coerce_id(json.get(flat)).or_else(|| coerce_id(status.and_then(|s| s.get(nested))))
        };

        Self {
            lead_id: id_field("lead_id", "id"),
            status_id: id_field("status_id", "status_id"),
            pipeline_id: id_field("pipeline_id", "pipeline_id"),
            old_status_id: id_field("old_status_id", "old_status_id"),
            account_id: coerce_id(json.get("account_id"))
                .or_else(|| coerce_id(account.and_then(|a| a.get("id")))),
            subdomain: coerce_text(json.get("subdomain"))
                .or_else(|| coerce_text(account.and_then(|a| a.get("subdomain")))),
        }
    }

    /// Decode amoCRM's `application/x-www-form-urlencoded` layout with
    /// bracketed array-style keys.
    fn from_form(raw: &str) -> Self {
        let mut event = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "leads[status][0][id]" => event.lead_id = parse_id(&value),
                "leads[status][0][status_id]" => event.status_id = parse_id(&value),
                "leads[status][0][pipeline_id]" => event.pipeline_id = parse_id(&value),
                "leads[status][0][old_status_id]" => event.old_status_id = parse_id(&value),
                "account[id]" => event.account_id = parse_id(&value),
                "account[subdomain]" => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        event.subdomain = Some(trimmed.to_string());
                    }
                }
                _ => {}
            }
        }
        event
    }
}

/// Coerce a JSON value into an id.
///
/// Accepts numbers and numeric strings; everything else (including an
/// empty string) is absent rather than zero, so downstream code never
/// mistakes a failed parse for a real id.
fn coerce_id(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_id(s),
        _ => None,
    }
}

fn coerce_text(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}
