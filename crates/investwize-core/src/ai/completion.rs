//! OpenAI-compatible chat completion client (Groq by default)

use super::{CompletionError, CompletionService};
use crate::config::{Config, Credential, API_KEY_ENV};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionResponseMessage>,
}

#[derive(Deserialize)]
struct CompletionResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    credential: Credential,
}

impl CompletionClient {
    pub fn new(endpoint: &str, model: &str, credential: Credential) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            credential,
        }
    }

    /// Replace the underlying HTTP client
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.endpoint(), &config.model(), config.credential())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub async fn query(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self
            .credential
            .read()
            .ok_or(CompletionError::MissingCredential(API_KEY_ENV))?;

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            model = %self.model,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "completion response received"
        );

        if !status.is_success() {
            return Err(CompletionError::Status {
                status,
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyCompletion)
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.query(prompt).await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FailureKind;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    /// One-shot local HTTP server returning a canned response and
    /// recording the raw request it received
    struct TestServer {
        url: String,
        request: Arc<Mutex<String>>,
    }

    impl TestServer {
        async fn start(status_line: &str, body: &str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let request = Arc::new(Mutex::new(String::new()));

            let response = format!(
                "HTTP/1.1 {}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {}",
                status_line,
                body.len(),
                body
            );

            let captured = request.clone();
            tokio::spawn(async move {
                if let Ok((mut socket, _)) = listener.accept().await {
                    let raw = read_request(&mut socket).await;
                    *captured.lock().await = raw;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            Self {
                url: format!("http://{}/openai/v1/chat/completions", addr),
                request,
            }
        }

        async fn request(&self) -> String {
            self.request.lock().await.clone()
        }
    }

    /// Read headers plus a Content-Length body
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn client(url: &str, key: Option<&str>) -> CompletionClient {
        // Keep loopback test traffic away from any proxy in the environment
        let http = Client::builder().no_proxy().build().unwrap();
        CompletionClient::new(
            url,
            "llama-3.3-70b-versatile",
            Credential::stored(key.map(str::to_string)),
        )
        .with_http_client(http)
    }

    fn request_body(raw: &str) -> serde_json::Value {
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_first_choice_content() {
        let server = TestServer::start(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Build an emergency fund first."}}]}"#,
        )
        .await;

        let reply = client(&server.url, Some("gsk_test"))
            .query("prompt text")
            .await
            .unwrap();
        assert_eq!(reply, "Build an emergency fund first.");
    }

    #[tokio::test]
    async fn test_request_shape() {
        let server = TestServer::start(
            "200 OK",
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        )
        .await;

        client(&server.url, Some("gsk_test"))
            .query("What is an ETF?")
            .await
            .unwrap();

        let raw = server.request().await;
        assert!(raw.starts_with("POST /openai/v1/chat/completions"));
        assert!(raw
            .lines()
            .any(|line| line.eq_ignore_ascii_case("authorization: Bearer gsk_test")));

        let body = request_body(&raw);
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["max_tokens"], 1200);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "What is an ETF?");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_request() {
        let err = client("http://127.0.0.1:9/unused", None)
            .query("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential(_)));
        assert_eq!(err.kind(), FailureKind::Configuration);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = TestServer::start(
            "401 Unauthorized",
            r#"{"error":{"message":"Invalid API Key"}}"#,
        )
        .await;

        let err = client(&server.url, Some("bad"))
            .query("prompt")
            .await
            .unwrap_err();
        match &err {
            CompletionError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Invalid API Key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), FailureKind::Upstream);
    }

    #[tokio::test]
    async fn test_empty_and_absent_content() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":""}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{}]}"#,
        ] {
            let server = TestServer::start("200 OK", body).await;
            let err = client(&server.url, Some("gsk_test"))
                .query("prompt")
                .await
                .unwrap_err();
            assert!(
                matches!(err, CompletionError::EmptyCompletion),
                "body {body}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = TestServer::start("200 OK", "<html>gateway</html>").await;
        let err = client(&server.url, Some("gsk_test"))
            .query("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
        assert_eq!(err.kind(), FailureKind::Upstream);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}/v1/chat/completions", addr), Some("k"))
            .query("prompt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }
}
