//! Text-generation collaborator used for session summaries.

use async_trait::async_trait;

use crate::error::Result;

/// Produces free text from a system instruction and a user prompt.
///
/// Implementations: [`HttpTextGenerator`] for OpenAI-compatible endpoints,
/// hand-written mocks in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

#[cfg(feature = "http")]
pub use http::HttpTextGenerator;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tracing::{debug, warn};

    use super::TextGenerator;
    use crate::config::SummaryConfig;
    use crate::error::{Error, Result};

    /// Chat-completions client for OpenAI-compatible endpoints.
    #[derive(Clone)]
    pub struct HttpTextGenerator {
        client: reqwest::Client,
        endpoint: String,
        model: String,
        api_key: Option<String>,
    }

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    #[derive(Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: [ChatMessage<'a>; 2],
        temperature: f32,
    }

    #[derive(Serialize)]
    struct ChatMessage<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Deserialize)]
    struct ChatResponse {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: ResponseMessage,
    }

    #[derive(Deserialize)]
    struct ResponseMessage {
        #[serde(default)]
        content: Option<String>,
    }

    impl HttpTextGenerator {
        pub fn new(
            endpoint: impl Into<String>,
            model: impl Into<String>,
            api_key: Option<String>,
        ) -> Result<Self> {
            Self::with_timeout(endpoint, model, api_key, DEFAULT_TIMEOUT)
        }

        /// Like [`new`](Self::new), abandoning each request after `timeout`.
        pub fn with_timeout(
            endpoint: impl Into<String>,
            model: impl Into<String>,
            api_key: Option<String>,
            timeout: Duration,
        ) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;
            Ok(Self {
                client,
                endpoint: endpoint.into(),
                model: model.into(),
                api_key,
            })
        }

        /// Build from config; `None` when no endpoint is configured.
        pub fn from_config(config: &SummaryConfig) -> Result<Option<Self>> {
            let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty())
            else {
                return Ok(None);
            };
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::Config(format!("Invalid summary endpoint: {}", endpoint)));
            }
            let api_key = std::env::var(&config.api_key_env).ok();
            if api_key.is_none() {
                warn!(env = %config.api_key_env, "No API key set for summary endpoint");
            }
            Self::with_timeout(endpoint, config.model.clone(), api_key, config.request_timeout())
                .map(Some)
        }
    }

    #[async_trait]
    impl TextGenerator for HttpTextGenerator {
        async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
            let body = ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage { role: "system", content: system },
                    ChatMessage { role: "user", content: prompt },
                ],
                temperature: 0.2,
            };

            let mut req = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                req = req.bearer_auth(key);
            }

            debug!(endpoint = %self.endpoint, model = %self.model, "Requesting summary");
            let resp = req.send().await?;
            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(Error::Generation(format!("HTTP {}: {}", status, text)));
            }

            let parsed: ChatResponse = resp.json().await?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| Error::Generation("Empty completion".to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::summary::Summarizer;
        use crate::types::Session;
        use std::sync::Arc;
        use tokio::net::TcpListener;

        /// Accepts connections and never answers them.
        async fn silent_endpoint() -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let mut held = Vec::new();
                while let Ok((stream, _)) = listener.accept().await {
                    held.push(stream);
                }
            });
            format!("http://{}/v1/chat/completions", addr)
        }

        #[test]
        fn test_from_config_without_endpoint() {
            let config = SummaryConfig::default();
            assert!(HttpTextGenerator::from_config(&config).unwrap().is_none());
        }

        #[test]
        fn test_from_config_rejects_non_http_endpoint() {
            let config = SummaryConfig {
                endpoint: Some("localhost:8080".to_string()),
                ..Default::default()
            };
            assert!(matches!(
                HttpTextGenerator::from_config(&config),
                Err(Error::Config(_))
            ));
        }

        #[tokio::test]
        async fn test_silent_endpoint_times_out() {
            let endpoint = silent_endpoint().await;
            let generator =
                HttpTextGenerator::with_timeout(endpoint, "m", None, Duration::from_millis(300))
                    .unwrap();

            let outcome =
                tokio::time::timeout(Duration::from_secs(10), generator.generate("s", "p")).await;

            assert!(matches!(outcome, Ok(Err(Error::Generation(_)))));
        }

        #[tokio::test]
        async fn test_silent_endpoint_falls_back_to_computed_summary() {
            let config = SummaryConfig {
                endpoint: Some(silent_endpoint().await),
                timeout_secs: 1,
                ..Default::default()
            };
            let generator = HttpTextGenerator::from_config(&config).unwrap().unwrap();
            let summarizer = Summarizer::new(Some(Arc::new(generator)), &config);
            let session = Session::new(chrono::Utc::now(), Some("ws".to_string()));

            let summary =
                tokio::time::timeout(Duration::from_secs(10), summarizer.summarize(&session))
                    .await
                    .unwrap();

            assert!(summary.summary.starts_with("Recorded 0 events"));
        }

        #[test]
        fn test_request_shape() {
            let body = ChatRequest {
                model: "m",
                messages: [
                    ChatMessage { role: "system", content: "s" },
                    ChatMessage { role: "user", content: "p" },
                ],
                temperature: 0.2,
            };
            let json = serde_json::to_value(&body).unwrap();
            assert_eq!(json["model"], "m");
            assert_eq!(json["messages"][0]["role"], "system");
            assert_eq!(json["messages"][1]["content"], "p");
        }
    }
}
