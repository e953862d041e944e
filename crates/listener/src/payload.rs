//! The payload-adapter seam and its JSON implementation.

use correlation::{HostingVariant, PushEvent};

use crate::{cloud, server, PayloadError};

/// Turns a raw webhook body into a [`PushEvent`].
pub trait PayloadAdapter: Send + Sync {
    /// Returns `Ok(None)` when the body is valid but carries no event.
    fn parse(&self, variant: HostingVariant, raw: &str) -> Result<Option<PushEvent>, PayloadError>;
}

/// Parses Cloud and Server JSON push payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadAdapter;

impl PayloadAdapter for JsonPayloadAdapter {
    fn parse(&self, variant: HostingVariant, raw: &str) -> Result<Option<PushEvent>, PayloadError> {
        let document: serde_json::Value = serde_json::from_str(raw)?;
        if document.is_null() {
            return Ok(None);
        }
        let push = match variant {
            HostingVariant::Cloud => cloud::parse(document)?,
            HostingVariant::Server => server::parse(document)?,
        };
        Ok(Some(push))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_document_is_no_event() {
        assert!(JsonPayloadAdapter
            .parse(HostingVariant::Cloud, "null")
            .unwrap()
            .is_none());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            JsonPayloadAdapter.parse(HostingVariant::Server, "{not json"),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn variant_selects_the_schema() {
        let server_body = r#"{"repository":{"slug":"widgets","project":{"key":"ACME"}},"changes":[]}"#;
        let push = JsonPayloadAdapter
            .parse(HostingVariant::Server, server_body)
            .unwrap()
            .unwrap();
        assert_eq!(push.repository.owner.as_str(), "ACME");

        // The same body read as Cloud lacks an owner.
        assert!(JsonPayloadAdapter
            .parse(HostingVariant::Cloud, server_body)
            .is_err());
    }
}
