//! Analysis Client
//!
//! Sends the Hedgehog prompt to a hosted Gemini model and returns a tagged
//! outcome. Nothing raises past this boundary: missing credentials and every
//! remote failure become `AnalysisOutcome::Failed`.
//!
//! One request per call. No retries, no caching (the session caches results).

use super::prompt::build_prompt;
use super::report::{html_escape, markdown_to_html};
use crate::config::AppConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const MISSING_KEY_MESSAGE: &str =
    "Error: Google API key not found. Set GOOGLE_API_KEY in the environment or .env file.";

// ============================================================
// ERRORS
// ============================================================

/// The two failure kinds callers can tell apart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    /// No API key configured
    MissingCredentials,
    /// Anything that went wrong talking to the model API
    Remote,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Google API key not found")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("model returned no text")]
    EmptyResponse,
}

impl AnalysisError {
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::MissingApiKey => AnalysisErrorKind::MissingCredentials,
            _ => AnalysisErrorKind::Remote,
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AnalysisError::Decode(err.to_string())
        } else if err.is_timeout() {
            AnalysisError::Transport("request timed out".to_string())
        } else if err.is_connect() {
            AnalysisError::Transport(format!("unable to reach the API ({})", err))
        } else {
            AnalysisError::Transport(err.to_string())
        }
    }
}

// ============================================================
// OUTCOME
// ============================================================

/// Result of one analysis request, as cached in the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Model text, verbatim
    Ready { text: String },
    Failed {
        kind: AnalysisErrorKind,
        message: String,
    },
}

impl AnalysisOutcome {
    pub fn ready(text: impl Into<String>) -> Self {
        AnalysisOutcome::Ready { text: text.into() }
    }

    pub fn missing_credentials() -> Self {
        AnalysisOutcome::Failed {
            kind: AnalysisErrorKind::MissingCredentials,
            message: MISSING_KEY_MESSAGE.to_string(),
        }
    }

    pub fn from_error(err: &AnalysisError) -> Self {
        match err.kind() {
            AnalysisErrorKind::MissingCredentials => Self::missing_credentials(),
            AnalysisErrorKind::Remote => AnalysisOutcome::Failed {
                kind: AnalysisErrorKind::Remote,
                message: format!("Error connecting to Gemini API: {}", err),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AnalysisOutcome::Ready { .. })
    }

    pub fn error_kind(&self) -> Option<AnalysisErrorKind> {
        match self {
            AnalysisOutcome::Ready { .. } => None,
            AnalysisOutcome::Failed { kind, .. } => Some(*kind),
        }
    }

    /// Markup shown on the page and embedded in the HTML report.
    /// Model Markdown is rendered; failure messages are escaped.
    pub fn to_markup(&self) -> String {
        match self {
            AnalysisOutcome::Ready { text } => markdown_to_html(text),
            AnalysisOutcome::Failed { message, .. } => format!("<p>{}</p>", html_escape(message)),
        }
    }

    /// Plain text for the text download: model text or the failure message
    pub fn to_text(&self) -> &str {
        match self {
            AnalysisOutcome::Ready { text } => text,
            AnalysisOutcome::Failed { message, .. } => message,
        }
    }
}

// ============================================================
// MODEL SEAM
// ============================================================

/// A hosted text-generation model
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

// Gemini `generateContent` wire types
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Join the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(text)
}

/// Gemini over the Generative Language REST API
pub struct GeminiModel {
    api_key: String,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiModel {
    pub fn new(api_key: &str, model: &str, api_base: &str) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// `Err(MissingApiKey)` when no key is configured
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        let api_key = config.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;
        Ok(Self::new(api_key, &config.model, &config.api_base))
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed)
    }
}

// ============================================================
// CLIENT
// ============================================================

/// Entry point used by the request handlers
#[derive(Clone)]
pub struct AnalysisClient {
    model: Option<Arc<dyn TextModel>>,
}

impl AnalysisClient {
    /// Gemini client from configuration; without a key every call reports
    /// missing credentials.
    pub fn from_config(config: &AppConfig) -> Self {
        match GeminiModel::from_config(config) {
            Ok(model) => Self::with_model(Arc::new(model)),
            Err(_) => Self::unconfigured(),
        }
    }

    pub fn with_model(model: Arc<dyn TextModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_name())
    }

    /// Request an analysis of the three lists.
    ///
    /// Callers guarantee all three lists are non-empty.
    pub async fn analyze(
        &self,
        passions: &[String],
        strengths: &[String],
        market_needs: &[String],
    ) -> AnalysisOutcome {
        let Some(model) = self.model.as_ref() else {
            log::warn!("Analysis requested without GOOGLE_API_KEY");
            return AnalysisOutcome::missing_credentials();
        };

        let prompt = build_prompt(passions, strengths, market_needs);
        log::info!(
            "Requesting analysis from {} ({} passions, {} strengths, {} market needs)",
            model.model_name(),
            passions.len(),
            strengths.len(),
            market_needs.len()
        );

        match model.generate(&prompt).await {
            Ok(text) => {
                log::info!("Analysis received ({} bytes)", text.len());
                AnalysisOutcome::ready(text)
            }
            Err(err) => {
                log::error!("Analysis request failed: {}", err);
                AnalysisOutcome::from_error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::Mutex;

    struct RecordingModel {
        /// `None` answers with an HTTP 403
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextModel for RecordingModel {
        fn model_name(&self) -> &str {
            "stub-model"
        }

        async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(AnalysisError::Status {
                    status: 403,
                    body: "API key not valid".to_string(),
                }),
            }
        }
    }

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[actix_rt::test]
    async fn test_analyze_returns_model_text_verbatim() {
        let model = Arc::new(RecordingModel {
            reply: Some("<h3>Your Hedgehog</h3><p>Teach writing.</p>".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        let client = AnalysisClient::with_model(model.clone());

        let outcome = client
            .analyze(
                &items(&["writing", "hiking"]),
                &items(&["public speaking"]),
                &items(&["coaching"]),
            )
            .await;

        assert_eq!(outcome, AnalysisOutcome::ready("<h3>Your Hedgehog</h3><p>Teach writing.</p>"));
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- hiking"));
    }

    #[actix_rt::test]
    async fn test_missing_credentials_message() {
        let client = AnalysisClient::from_config(&AppConfig::default());
        assert!(client.model_name().is_none());

        let outcome = client.analyze(&items(&["a"]), &items(&["b"]), &items(&["c"])).await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                kind: AnalysisErrorKind::MissingCredentials,
                message: MISSING_KEY_MESSAGE.to_string(),
            }
        );
    }

    #[actix_rt::test]
    async fn test_remote_error_becomes_failed_outcome() {
        let model = Arc::new(RecordingModel {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        });
        let client = AnalysisClient::with_model(model);

        let outcome = client.analyze(&items(&["a"]), &items(&["b"]), &items(&["c"])).await;
        assert_eq!(outcome.error_kind(), Some(AnalysisErrorKind::Remote));
        match outcome {
            AnalysisOutcome::Failed { message, .. } => {
                assert!(message.starts_with("Error connecting to Gemini API:"));
                assert!(message.contains("403"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_uses_key() {
        let config = AppConfig {
            api_key: Some("k".to_string()),
            ..AppConfig::default()
        };
        let client = AnalysisClient::from_config(&config);
        assert_eq!(client.model_name(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_endpoint_format() {
        let model = GeminiModel::new("k", "gemini-2.5-flash", "http://localhost:9999/");
        assert_eq!(
            model.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_extract_text_joins_parts_of_first_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello "}, {"text": "world"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_without_candidates_is_error() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(matches!(extract_text(parsed), Err(AnalysisError::EmptyResponse)));
    }

    #[test]
    fn test_failure_markup_is_escaped() {
        let outcome = AnalysisOutcome::Failed {
            kind: AnalysisErrorKind::Remote,
            message: "Error connecting to Gemini API: <bad>".to_string(),
        };
        assert_eq!(outcome.to_markup(), "<p>Error connecting to Gemini API: &lt;bad&gt;</p>");
    }

    #[actix_rt::test]
    async fn test_gemini_sends_key_and_prompt_and_joins_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "contents": [{"parts": [{"text": "Describe my hedgehog"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r###"{"candidates":[{"content":{"role":"model","parts":[{"text":"## Sweet spot\n"},{"text":"- coach writers"}]}}]}"###,
            )
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-test", &server.url());
        let text = model.generate("Describe my hedgehog").await.unwrap();

        assert_eq!(text, "## Sweet spot\n- coach writers");
        mock.assert_async().await;
    }

    #[actix_rt::test]
    async fn test_gemini_http_error_becomes_remote_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let model = GeminiModel::new("bad-key", "gemini-test", &server.url());
        let client = AnalysisClient::with_model(Arc::new(model));
        let outcome = client.analyze(&items(&["a"]), &items(&["b"]), &items(&["c"])).await;

        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                kind: AnalysisErrorKind::Remote,
                message: "Error connecting to Gemini API: API returned HTTP 403: API key not valid"
                    .to_string(),
            }
        );
        mock.assert_async().await;
    }

    #[actix_rt::test]
    async fn test_gemini_unreadable_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-test", &server.url());
        let err = model.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)), "got {:?}", err);
    }

    #[actix_rt::test]
    async fn test_gemini_without_candidates_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let model = GeminiModel::new("test-key", "gemini-test", &server.url());
        let err = model.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
        assert_eq!(err.kind(), AnalysisErrorKind::Remote);
    }

    #[test]
    fn test_ready_markup_renders_markdown() {
        let outcome = AnalysisOutcome::ready("## X\n- a");
        let markup = outcome.to_markup();
        assert!(markup.contains("<h2>X</h2>"));
        assert!(markup.contains("<li>a</li>"));
        assert_eq!(outcome.to_text(), "## X\n- a");
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(AnalysisOutcome::missing_credentials()).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "missing_credentials");
    }
}
