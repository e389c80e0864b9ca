/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use amo_capi_bridge::capi_models::ConversionEvent;
use amo_capi_bridge::hashing::hash_identifier;
use amo_capi_bridge::models::AttributionData;
use amo_capi_bridge::webhook_models::StatusChangeEvent;
use proptest::prelude::*;

// Property: decoding is total, it never panics and never errors
proptest! {
    #[test]
    fn decoding_never_panics(body in "\\PC*") {
        let _ = StatusChangeEvent::decode(&body);
    }

    #[test]
    fn form_encoded_lead_ids_round_trip(id in any::<u64>()) {
        let body = format!("leads[status][0][id]={}", id);
        let event = StatusChangeEvent::decode(&body);
        prop_assert_eq!(event.lead_id, Some(id));
    }

    #[test]
    fn json_lead_ids_round_trip(id in any::<u64>()) {
        let body = format!(r#"{{"lead_id": {}}}"#, id);
        let event = StatusChangeEvent::decode(&body);
        prop_assert_eq!(event.lead_id, Some(id));
    }

    #[test]
    fn non_numeric_form_ids_decode_to_absent(raw in "[a-zA-Z]{1,12}") {
        let body = format!("leads[status][0][id]={}", raw);
        let event = StatusChangeEvent::decode(&body);
        prop_assert_eq!(event.lead_id, None);
    }
}

// Property: identifier hashing never panics and normalizes consistently
proptest! {
    #[test]
    fn hashing_never_panics(value in "\\PC*") {
        let _ = hash_identifier(Some(&value));
    }

    #[test]
    fn hashing_is_case_and_whitespace_invariant(core in "[a-z0-9@.]{1,24}") {
        let padded = format!("  {}  ", core.to_uppercase());
        prop_assert_eq!(
            hash_identifier(Some(&padded)),
            hash_identifier(Some(&core))
        );
    }

    #[test]
    fn digests_are_64_lowercase_hex_chars(value in "[a-zA-Z0-9@.+ -]{1,40}") {
        if let Some(digest) = hash_identifier(Some(&value)) {
            prop_assert_eq!(digest.len(), 64);
            prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}

// Property: the deduplication key depends only on the lead id
proptest! {
    #[test]
    fn event_ids_are_stable_across_send_times(lead_id in any::<u64>(), t1 in any::<i64>(), t2 in any::<i64>()) {
        let first = ConversionEvent::compose(
            lead_id, 1.0, "USD", AttributionData::default(), None, None, t1,
        );
        let second = ConversionEvent::compose(
            lead_id, 1.0, "USD", AttributionData::default(), None, None, t2,
        );
        prop_assert_eq!(first.event_id, second.event_id);
    }
}
