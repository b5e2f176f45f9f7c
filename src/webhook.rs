//! Webhook payload structures
//!
//! Only the fields this service acts on are decoded; everything else GitHub
//! sends is ignored.

use serde::Deserialize;

use crate::error::{HookError, Result};

pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// Push event payload, see
/// <https://docs.github.com/en/webhooks/webhook-events-and-payloads#push>
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PushPayload {
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Repository {
    pub name: String,
}

impl PushPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| HookError::MalformedPayload(e.to_string()))
    }
}

/// Event kind announced in the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEvent {
    Push,
    Ping,
    Other(String),
}

impl GitHubEvent {
    /// Deliveries without the header are handled as pushes.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("push") => GitHubEvent::Push,
            Some("ping") => GitHubEvent::Ping,
            Some(other) => GitHubEvent::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_minimal_payload() {
        let payload = PushPayload::from_slice(br#"{"repository":{"name":"blog"}}"#).unwrap();
        assert_eq!(payload.repository.name, "blog");
    }

    #[test]
    fn ignores_unrelated_fields() {
        let body = br#"{
            "ref": "refs/heads/main",
            "after": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c",
            "repository": {
                "id": 1296269,
                "name": "blog",
                "full_name": "octocat/blog",
                "html_url": "https://github.com/octocat/blog"
            },
            "pusher": {"name": "octocat"}
        }"#;
        let payload = PushPayload::from_slice(body).unwrap();
        assert_eq!(payload.repository.name, "blog");
    }

    #[test]
    fn rejects_missing_name() {
        let err = PushPayload::from_slice(br#"{"repository":{"full_name":"a/b"}}"#).unwrap_err();
        assert!(matches!(err, HookError::MalformedPayload(_)));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            PushPayload::from_slice(b"payload=%7B%7D"),
            Err(HookError::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_wrong_type() {
        assert!(PushPayload::from_slice(br#"{"repository":{"name":42}}"#).is_err());
    }

    #[test]
    fn event_header_parsing() {
        assert_eq!(GitHubEvent::from_header(None), GitHubEvent::Push);
        assert_eq!(GitHubEvent::from_header(Some("push")), GitHubEvent::Push);
        assert_eq!(GitHubEvent::from_header(Some("ping")), GitHubEvent::Ping);
        assert_eq!(
            GitHubEvent::from_header(Some("issues")),
            GitHubEvent::Other("issues".to_string())
        );
    }
}
