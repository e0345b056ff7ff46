//! LLM Client: the single point of entry for all evaluator calls.
//!
//! ARCHITECTURAL RULE: No other module may call the evaluator API directly.
//! All outbound evaluation traffic MUST go through this module.
//!
//! Model: gpt-4o (hardcoded, not configurable)
//!
//! No retries happen here. Retry policy belongs to the caller.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::evaluation::request::EvaluationRequest;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for every evaluation.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no evaluator credential supplied")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    File { file: FileData<'a> },
}

#[derive(Debug, Serialize)]
struct FileData<'a> {
    filename: &'a str,
    file_data: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn request_body(request: &EvaluationRequest) -> Result<serde_json::Value, LlmError> {
    let body = ChatRequest {
        model: MODEL,
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(&request.system_prompt),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: &request.user_prompt,
                    },
                    ContentPart::File {
                        file: FileData {
                            filename: &request.document.filename,
                            file_data: request.document.data_uri(),
                        },
                    },
                ]),
            },
        ],
        max_tokens: MAX_TOKENS,
    };
    Ok(serde_json::to_value(body)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// Status and body of one HTTP exchange, before any interpretation.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Performs the raw authenticated POST. Swapped for a recording fake in tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        credential: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, LlmError>;
}

/// Production transport over `reqwest`. The timeout is the only one enforced anywhere.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl ChatTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        credential: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(credential)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the chat-completions API: auth check, request encoding and status handling.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn ChatTransport>,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_url: String, timeout: Duration) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new(timeout)), api_url)
    }

    pub fn with_transport(transport: Arc<dyn ChatTransport>, api_url: String) -> Self {
        Self { transport, api_url }
    }

    /// Sends one evaluation and returns the evaluator's raw answer text.
    ///
    /// Fails fast with `MissingCredential` before any network activity.
    pub async fn submit(
        &self,
        request: &EvaluationRequest,
        credential: Option<&str>,
    ) -> Result<String, LlmError> {
        let credential = require_credential(credential)?;

        debug!(
            "Submitting '{}' for evaluation (language={}, today={})\n{}",
            request.document.filename,
            request.target_language,
            request.temporal_context.month_year(),
            request.criteria_summary
        );
        let body = request_body(request)?;
        let response = self.transport.post(&self.api_url, credential, &body).await?;

        if !(200..300).contains(&response.status) {
            warn!("Evaluator API returned {}", response.status);
            return Err(LlmError::Api {
                status: response.status,
                message: error_message(response.status, &response.body),
            });
        }

        Ok(completion_text(response.body))
    }
}

/// A credential that is absent or blank counts as missing.
pub fn require_credential(credential: Option<&str>) -> Result<&str, LlmError> {
    credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(LlmError::MissingCredential)
}

/// Prefers the structured `error.message`, else a generic status message.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

/// First choice's message content. An envelope that cannot be read yields the
/// whole body so the parser's fallback can still show it.
fn completion_text(body: String) -> String {
    match serde_json::from_str::<ChatResponse>(&body) {
        Ok(response) => {
            if let Some(usage) = &response.usage {
                debug!(
                    "Evaluator call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }
            match response.choices.into_iter().next().and_then(|c| c.message.content) {
                Some(content) => content,
                None => {
                    warn!("Evaluator response had no message content");
                    body
                }
            }
        }
        Err(e) => {
            warn!("Evaluator response envelope not understood: {e}");
            body
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording transport used by tests across the crate.

    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub url: String,
        pub credential: String,
        pub body: serde_json::Value,
    }

    pub struct RecordingTransport {
        response: TransportResponse,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl RecordingTransport {
        pub fn new(status: u16, body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                response: TransportResponse {
                    status,
                    body: body.into(),
                },
                calls: Mutex::new(Vec::new()),
            })
        }

        /// A 200 response whose first choice carries `content`.
        pub fn completion(content: &str) -> Arc<Self> {
            let body = serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": content}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 20}
            });
            Self::new(200, body.to_string())
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn post(
            &self,
            url: &str,
            credential: &str,
            body: &serde_json::Value,
        ) -> Result<TransportResponse, LlmError> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                credential: credential.to_string(),
                body: body.clone(),
            });
            Ok(self.response.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::testing::RecordingTransport;
    use super::*;
    use crate::evaluation::criteria::{normalize, RawCriteria};
    use crate::evaluation::document::EncodedDocument;
    use crate::evaluation::request::{build_request, Language};

    fn request() -> EvaluationRequest {
        let criteria = normalize(&RawCriteria {
            keywords: vec!["python".to_string()],
            required_experience: "2 years".to_string(),
            tech_stack: vec!["docker".to_string()],
            degree: "BSc".to_string(),
            additional_attributes: String::new(),
        })
        .unwrap();
        let document = EncodedDocument {
            filename: "cv.pdf".to_string(),
            base64: "QUJD".to_string(),
        };
        build_request(
            &criteria,
            document,
            Language::English,
            Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
        )
    }

    fn client(transport: Arc<RecordingTransport>) -> LlmClient {
        LlmClient::with_transport(transport, "https://evaluator.test/v1/chat".to_string())
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_transport() {
        let transport = RecordingTransport::completion("{}");
        let err = client(transport.clone()).submit(&request(), None).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let transport = RecordingTransport::completion("{}");
        let err = client(transport.clone())
            .submit(&request(), Some("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_returns_first_choice_content() {
        let transport = RecordingTransport::completion("hello");
        let text = client(transport.clone())
            .submit(&request(), Some("sk-test"))
            .await
            .unwrap();
        assert_eq!(text, "hello");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://evaluator.test/v1/chat");
        assert_eq!(calls[0].credential, "sk-test");
    }

    #[tokio::test]
    async fn test_request_body_matches_wire_contract() {
        let transport = RecordingTransport::completion("{}");
        client(transport.clone())
            .submit(&request(), Some("sk-test"))
            .await
            .unwrap();

        let body = &transport.calls()[0].body;
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("1/2025"));

        let parts = &body["messages"][1]["content"];
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(parts[0]["type"], "text");
        assert!(parts[0]["text"].as_str().unwrap().contains("Keywords: python"));
        assert_eq!(parts[1]["type"], "file");
        assert_eq!(parts[1]["file"]["filename"], "cv.pdf");
        assert_eq!(parts[1]["file"]["file_data"], "data:application/pdf;base64,QUJD");
    }

    #[tokio::test]
    async fn test_error_status_uses_structured_message() {
        let transport = RecordingTransport::new(
            401,
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
        );
        let err = client(transport).submit(&request(), Some("sk-bad")).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_without_json_uses_generic_message() {
        let transport = RecordingTransport::new(503, "<html>Service Unavailable</html>");
        let err = client(transport).submit(&request(), Some("sk-test")).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "request failed with status 503");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_envelope_returns_whole_body() {
        let transport = RecordingTransport::new(200, "plain text body");
        let text = client(transport).submit(&request(), Some("sk-test")).await.unwrap();
        assert_eq!(text, "plain text body");
    }

    #[test]
    fn test_null_content_returns_whole_body() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#.to_string();
        assert_eq!(completion_text(body.clone()), body);
    }

    #[test]
    fn test_error_message_ignores_blank_message() {
        assert_eq!(
            error_message(500, r#"{"error": {"message": ""}}"#),
            "request failed with status 500"
        );
    }
}
