//! Transport request/response types and the message handler.
//!
//! The exact wire framing belongs to the host environment (extension
//! message passing, HTTP, a bot command pipeline); this module defines the
//! payloads and routes them to the classifier and the dismissal store.

use crate::classifier::Classifier;
use crate::dismissal::DismissalStore;
use crate::error::Result;
use async_trait::async_trait;
use beacon_core::{Classification, ClassificationTransport, CoreError, FieldKey};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Requests the host can carry to the classification core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    /// Classify a URL.
    TestUrl {
        /// The URL to classify
        url: String,
    },
    /// Persist a dismissal for a field key and selector.
    DismissUrl {
        /// The dataset field key of the dismissed match
        key: FieldKey,
        /// The dismissed selector
        selector: String,
    },
    /// Ask the page-resident collaborator to re-run its whole-page
    /// classification. Carried host-to-page after a navigation the host
    /// detected; the handler only acknowledges it.
    RequestUrlTest,
}

/// Responses to [`Request`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Result of a `TestUrl` request.
    TestUrl(Classification),
    /// Acknowledgement of a `DismissUrl` request.
    DismissUrl(bool),
    /// Acknowledgement without a payload.
    Ack,
}

/// Routes transport requests to the classifier and the dismissal store.
pub struct MessageHandler {
    classifier: Classifier,
    dismissals: Arc<dyn DismissalStore>,
}

impl MessageHandler {
    /// Create a handler over a classifier and the dismissal store it
    /// shares with the host.
    #[must_use]
    pub fn new(classifier: Classifier, dismissals: Arc<dyn DismissalStore>) -> Self {
        Self {
            classifier,
            dismissals,
        }
    }

    /// Handle a single request.
    pub async fn handle(&self, request: Request) -> Result<Response> {
        match request {
            Request::TestUrl { url } => {
                let result = self.classifier.classify(&url).await?;
                Ok(Response::TestUrl(result))
            }
            Request::DismissUrl { key, selector } => {
                let dismissal_key = format!("{}_{selector}", key.as_str());
                self.dismissals
                    .set_dismissed(&dismissal_key, Utc::now())
                    .await?;
                debug!(key = dismissal_key, "persisted dismissal");
                Ok(Response::DismissUrl(true))
            }
            Request::RequestUrlTest => Ok(Response::Ack),
        }
    }
}

#[async_trait(?Send)]
impl ClassificationTransport for MessageHandler {
    async fn test_url(&self, url: &str) -> beacon_core::Result<Classification> {
        self.classifier
            .classify(url)
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))
    }

    async fn dismiss_url(&self, key: FieldKey, selector: &str) -> beacon_core::Result<bool> {
        let response = self
            .handle(Request::DismissUrl {
                key,
                selector: selector.to_string(),
            })
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;

        match response {
            Response::DismissUrl(ack) => Ok(ack),
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_dataset::DatasetLoader;
    use beacon_rules::RuleRegistry;
    use beacon_store::MemoryStore;

    fn fixture_handler(store: Arc<MemoryStore>) -> MessageHandler {
        let dataset = DatasetLoader::from_str(
            r#"[{"id": "1", "n": "Acme", "r": ["h"], "li": "acme"}]"#,
        )
        .expect("parse fixture dataset");

        let classifier = Classifier::new(
            Arc::new(RuleRegistry::builtin()),
            Arc::new(dataset),
            store.clone(),
        );
        MessageHandler::new(classifier, store)
    }

    #[test]
    fn test_request_serde() {
        let request = Request::TestUrl {
            url: "https://example.com".to_string(),
        };
        let json = serde_json::to_string(&request).expect("serialize request");
        assert!(json.contains("\"action\":\"TestUrl\""));

        let parsed: Request =
            serde_json::from_str(r#"{"action":"DismissUrl","key":"li","selector":"acme"}"#)
                .expect("deserialize request");
        assert_eq!(
            parsed,
            Request::DismissUrl {
                key: FieldKey::LinkedIn,
                selector: "acme".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_test_url_round_trip() {
        let handler = fixture_handler(Arc::new(MemoryStore::new()));

        let response = handler
            .handle(Request::TestUrl {
                url: "https://linkedin.com/company/acme".to_string(),
            })
            .await
            .expect("handle request");

        match response {
            Response::TestUrl(result) => assert!(result.is_flagged()),
            other => panic!("expected TestUrl response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dismiss_persists_and_affects_classification() {
        let store = Arc::new(MemoryStore::new());
        let handler = fixture_handler(store.clone());

        let response = handler
            .handle(Request::DismissUrl {
                key: FieldKey::LinkedIn,
                selector: "acme".to_string(),
            })
            .await
            .expect("handle dismissal");
        assert_eq!(response, Response::DismissUrl(true));
        assert!(store.dismissed_at("li_acme").is_some());

        let response = handler
            .handle(Request::TestUrl {
                url: "https://linkedin.com/company/acme".to_string(),
            })
            .await
            .expect("handle test");
        match response {
            Response::TestUrl(Classification::Flagged { dismissed, .. }) => assert!(dismissed),
            other => panic!("expected dismissed flagged result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_url_test_acknowledged() {
        let handler = fixture_handler(Arc::new(MemoryStore::new()));
        let response = handler
            .handle(Request::RequestUrlTest)
            .await
            .expect("handle request");
        assert_eq!(response, Response::Ack);
    }
}
