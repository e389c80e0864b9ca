use crate::amo_client::AmoClient;
use crate::capi_client::CapiClient;
use crate::capi_models::ConversionEvent;
use crate::hashing::hash_identifier;
use crate::models::{AttributionData, FieldMap};
use crate::webhook_models::StatusChangeEvent;

/// Terminal outcome of a single pipeline run.
///
/// Every webhook maps to exactly one of these, and the HTTP boundary
/// replies 200 with the code as a plain-text body. A non-200 would make
/// the CRM redeliver, and redelivery of a failed run risks duplicate
/// conversions; idempotence lives in the deterministic event id instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Decode produced no usable lead id or subdomain.
    NoLead,
    /// The status change does not match the configured target status.
    Ignored,
    /// Lead has no positive price; not eligible to convert.
    NoData,
    /// Lead has no linked contact. A valid terminal state, no event sent.
    OkNoContact,
    /// Conversion event accepted by the ad platform.
    PurchaseSent,
    /// An upstream call failed; details are in the logs only.
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NoLead => "NO_LEAD",
            Outcome::Ignored => "IGNORED",
            Outcome::NoData => "NO_DATA",
            Outcome::OkNoContact => "OK_NO_CONTACT",
            Outcome::PurchaseSent => "PURCHASE_SENT",
            Outcome::Error => "ERROR",
        }
    }
}

/// Sequences decode → gate → lead fetch → price check → contact resolve →
/// contact fetch → extract/hash/compose → dispatch.
///
/// Each run is stateless and strictly sequential: every step needs the
/// previous step's result. This is the only place allowed to decide a
/// terminal outcome; component failures are absorbed here.
#[derive(Clone)]
pub struct Pipeline {
    amo: AmoClient,
    capi: CapiClient,
    target_status_id: Option<u64>,
    currency: String,
}

impl Pipeline {
    pub fn new(
        amo: AmoClient,
        capi: CapiClient,
        target_status_id: Option<u64>,
        currency: String,
    ) -> Self {
        Self {
            amo,
            capi,
            target_status_id,
            currency,
        }
    }

    /// Runs one webhook through the whole pipeline.
    pub async fn handle(&self, raw_body: &str) -> Outcome {
        tracing::debug!("Raw webhook body: {}", raw_body);

        // 1. Decode (total: falls back to form encoding, never fails)
        let event = StatusChangeEvent::decode(raw_body);
        tracing::debug!("Decoded status-change event: {:?}", event);

        let (Some(lead_id), Some(subdomain)) = (event.lead_id, event.subdomain.as_deref()) else {
            tracing::warn!("Webhook carried no usable lead id or subdomain");
            return Outcome::NoLead;
        };

        // 2. Gate on the configured target status
        if let Some(target) = self.target_status_id {
            if event.status_id != Some(target) {
                tracing::info!(
                    "Lead {}: status {:?} does not match target {}, ignoring",
                    lead_id,
                    event.status_id,
                    target
                );
                return Outcome::Ignored;
            }
        }

        // 3. Fetch the lead with its embedded contact references
        let lead = match self.amo.fetch_lead(subdomain, lead_id, true).await {
            Ok(lead) => lead,
            Err(e) => {
                tracing::error!("Lead {}: amoCRM lead fetch failed: {}", lead_id, e);
                return Outcome::Error;
            }
        };

        // 4. A lead without a positive price is not eligible to convert
        let price = match lead.price_value() {
            Some(price) if price > 0.0 => price,
            _ => {
                tracing::info!("Lead {}: no positive price, nothing to convert", lead_id);
                return Outcome::NoData;
            }
        };

        // 5. Resolve the linked contact
        let Some(contact_id) = lead.first_contact_id() else {
            tracing::info!("Lead {}: no linked contact, conversion skipped", lead_id);
            return Outcome::OkNoContact;
        };

        // 6. Fetch the contact
        let contact = match self.amo.fetch_contact(subdomain, contact_id).await {
            Ok(contact) => contact,
            Err(e) => {
                tracing::error!(
                    "Lead {}: amoCRM contact {} fetch failed: {}",
                    lead_id,
                    contact_id,
                    e
                );
                return Outcome::Error;
            }
        };

        // 7. Extract, hash, compose (pure; missing attributes degrade to
        //    empty identifier arrays and omitted attribution keys)
        let attribution =
            AttributionData::from_fields(&FieldMap::from_fields(lead.custom_fields_values.as_deref()));
        let contact_fields = FieldMap::from_fields(contact.custom_fields_values.as_deref());

        let conversion = ConversionEvent::compose(
            lead_id,
            price,
            &self.currency,
            attribution,
            hash_identifier(contact_fields.email()),
            hash_identifier(contact_fields.phone()),
            chrono::Utc::now().timestamp(),
        );

        // 8. Dispatch
        match self.capi.send_event(&conversion).await {
            Ok(()) => {
                tracing::info!(
                    "✓ Lead {}: purchase event {} sent",
                    lead_id,
                    conversion.event_id
                );
                Outcome::PurchaseSent
            }
            Err(e) => {
                tracing::error!("Lead {}: graph dispatch failed: {}", lead_id, e);
                Outcome::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_codes_match_boundary_vocabulary() {
        assert_eq!(Outcome::NoLead.as_str(), "NO_LEAD");
        assert_eq!(Outcome::Ignored.as_str(), "IGNORED");
        assert_eq!(Outcome::NoData.as_str(), "NO_DATA");
        assert_eq!(Outcome::OkNoContact.as_str(), "OK_NO_CONTACT");
        assert_eq!(Outcome::PurchaseSent.as_str(), "PURCHASE_SENT");
        assert_eq!(Outcome::Error.as_str(), "ERROR");
    }
}
