use crate::models::AttributionData;
use serde::Serialize;

/// Marker telling the ad platform the event was produced server-side, not
/// by a browser pixel.
pub const ACTION_SOURCE: &str = "system_generated";

const EVENT_NAME: &str = "Purchase";
const EVENT_ID_PREFIX: &str = "amo_";

/// Outbound conversion event in the graph API's wire format.
///
/// `event_id` is deterministic per lead, so repeat webhook deliveries
/// deduplicate on the platform side. That is this system's only
/// idempotence guarantee.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionEvent {
    pub event_name: String,
    /// Send time, epoch seconds.
    pub event_time: i64,
    pub event_id: String,
    pub action_source: String,
    pub user_data: UserData,
    pub custom_data: CustomData,
}

/// Hashed identifiers. The graph API schema expects arrays here: an
/// unknown identifier is an empty array, never null.
#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    pub em: Vec<String>,
    pub ph: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomData {
    pub value: f64,
    pub currency: String,
    #[serde(flatten)]
    pub attribution: AttributionData,
}

impl ConversionEvent {
    /// Builds a purchase event from enriched lead and contact data.
    ///
    /// Assumes the orchestrator has already gated on a valid positive
    /// price; the composer itself is pure and cannot fail.
    pub fn compose(
        lead_id: u64,
        price: f64,
        currency: &str,
        attribution: AttributionData,
        hashed_email: Option<String>,
        hashed_phone: Option<String>,
        event_time: i64,
    ) -> Self {
        Self {
            event_name: EVENT_NAME.to_string(),
            event_time,
            event_id: format!("{}{}", EVENT_ID_PREFIX, lead_id),
            action_source: ACTION_SOURCE.to_string(),
            user_data: UserData {
                em: hashed_email.into_iter().collect(),
                ph: hashed_phone.into_iter().collect(),
            },
            custom_data: CustomData {
                value: price,
                currency: currency.to_string(),
                attribution,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(hashed_email: Option<String>) -> ConversionEvent {
        ConversionEvent::compose(
            501,
            5000.0,
            "USD",
            AttributionData {
                utm_source: Some("facebook".to_string()),
                ..Default::default()
            },
            hashed_email,
            None,
            1_700_000_000,
        )
    }

    #[test]
    fn test_event_id_is_deterministic_per_lead() {
        let first = sample_event(None);
        let second = sample_event(None);
        assert_eq!(first.event_id, "amo_501");
        assert_eq!(first.event_id, second.event_id);
    }

    #[test]
    fn test_identifier_arrays_are_singleton_or_empty() {
        let with_email = sample_event(Some("digest".to_string()));
        assert_eq!(with_email.user_data.em, vec!["digest"]);
        assert!(with_email.user_data.ph.is_empty());

        let without_email = sample_event(None);
        assert!(without_email.user_data.em.is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(sample_event(Some("digest".to_string()))).unwrap();

        assert_eq!(json["event_name"], "Purchase");
        assert_eq!(json["action_source"], "system_generated");
        assert_eq!(json["event_id"], "amo_501");
        assert_eq!(json["user_data"]["em"][0], "digest");
        // Empty array serializes as [], never null
        assert_eq!(json["user_data"]["ph"], serde_json::json!([]));
        assert_eq!(json["custom_data"]["value"], 5000.0);
        assert_eq!(json["custom_data"]["currency"], "USD");
        assert_eq!(json["custom_data"]["utm_source"], "facebook");
        // Absent attribution fields are omitted entirely
        assert!(json["custom_data"].get("utm_medium").is_none());
    }
}
