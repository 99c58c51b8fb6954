//! Turns a user question into the coach's reply.
//!
//! The completion service is tried once. Any failure is logged and replaced
//! by the canned block for the question's topic, so resolving always yields
//! text.

use crate::ai::{CompletionError, CompletionService};
use crate::fallback::Topic;
use crate::prompt::build_prompt;
use std::sync::Arc;
use std::time::Instant;

/// Where a reply came from
#[derive(Debug)]
pub enum Resolution {
    Primary {
        text: String,
    },
    Fallback {
        topic: Topic,
        text: &'static str,
        reason: CompletionError,
    },
}

impl Resolution {
    pub fn text(&self) -> &str {
        match self {
            Resolution::Primary { text } => text.as_str(),
            Resolution::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Resolution::Primary { text } => text,
            Resolution::Fallback { text, .. } => text.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }
}

#[derive(Clone)]
pub struct ResponseResolver {
    service: Arc<dyn CompletionService>,
}

impl ResponseResolver {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    pub async fn resolve(&self, user_text: &str) -> String {
        self.resolve_detailed(user_text).await.into_text()
    }

    pub async fn resolve_detailed(&self, user_text: &str) -> Resolution {
        let prompt = build_prompt(user_text);
        let start = Instant::now();

        match self.service.complete(&prompt).await {
            Ok(text) => {
                tracing::info!(
                    model = %self.service.model_id(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    chars = text.chars().count(),
                    "completion succeeded"
                );
                Resolution::Primary { text }
            }
            Err(reason) => {
                let topic = Topic::classify(user_text);
                tracing::warn!(
                    model = %self.service.model_id(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    kind = reason.kind().as_str(),
                    error = %reason,
                    topic = topic.as_str(),
                    "completion failed, using fallback response"
                );
                Resolution::Fallback {
                    topic,
                    text: topic.response(),
                    reason,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionClient, FailureKind};
    use crate::config::Credential;
    use crate::fallback::fallback_response;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted completion service
    struct StubService {
        reply: fn() -> Result<String, CompletionError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubService {
        fn new(reply: fn() -> Result<String, CompletionError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionService for StubService {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            (self.reply)()
        }

        fn model_id(&self) -> &str {
            "stub"
        }
    }

    fn failing() -> Arc<StubService> {
        StubService::new(|| Err(CompletionError::EmptyCompletion))
    }

    fn unconfigured() -> ResponseResolver {
        let client = CompletionClient::new(
            "http://127.0.0.1:9/v1/chat/completions",
            "llama-3.3-70b-versatile",
            Credential::stored(None),
        );
        ResponseResolver::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_primary_text_is_returned() {
        let service = StubService::new(|| Ok("Index funds are a solid start.".to_string()));
        let resolver = ResponseResolver::new(service.clone());

        let resolution = resolver.resolve_detailed("invest $1000?").await;
        assert!(!resolution.is_fallback());
        assert_eq!(resolution.text(), "Index funds are a solid start.");

        let prompts = service.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("User Question: invest $1000?"));
    }

    #[tokio::test]
    async fn test_fallback_blocks_by_keyword() {
        let resolver = ResponseResolver::new(failing());
        let cases = [
            ("budget", Topic::Budgeting),
            ("spending", Topic::Budgeting),
            ("invest", Topic::Investing),
            ("portfolio", Topic::Investing),
            ("save", Topic::Saving),
            ("savings", Topic::Saving),
            ("debt", Topic::Debt),
            ("loan", Topic::Debt),
            ("hello", Topic::Overview),
        ];
        for (input, topic) in cases {
            assert_eq!(resolver.resolve(input).await, topic.response(), "input: {input}");
        }
    }

    #[tokio::test]
    async fn test_fallback_is_case_insensitive() {
        let resolver = ResponseResolver::new(failing());
        assert_eq!(
            resolver.resolve("BUDGET please").await,
            resolver.resolve("budget please").await
        );
    }

    #[tokio::test]
    async fn test_missing_credential_keeps_reason() {
        let resolution = unconfigured().resolve_detailed("my student loan").await;
        match resolution {
            Resolution::Fallback {
                topic,
                text,
                reason,
            } => {
                assert_eq!(topic, Topic::Debt);
                assert_eq!(text, fallback_response("my student loan"));
                assert_eq!(reason.kind(), FailureKind::Configuration);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_is_total() {
        let resolver = unconfigured();
        for input in ["a", "?", "¿Cómo ahorro dinero?", "12345", "budget🙂"] {
            assert!(!resolver.resolve(input).await.trim().is_empty());
        }
    }
}
