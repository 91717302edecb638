//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! Every call is a single `generateContent` request carrying the whole
//! conversation; no server-side chat state is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use blueprint_core::agent::{AssistantClient, GenerationRequest, RequestPart, RequestTurn};
use blueprint_core::session::MessageRole;
use blueprint_core::{BlueprintError, Result};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Assistant client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a client with the provided API key and model.
    ///
    /// An empty key is accepted here; every request then fails with a
    /// configuration error before anything is sent.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the client at another endpoint (a proxy or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Applies a whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BlueprintError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            // reqwest errors can echo the URL, which carries the key.
            .map_err(|err| {
                BlueprintError::delivery(
                    None,
                    format!("Gemini API request failed: {}", err.without_url()),
                )
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            BlueprintError::delivery(
                Some(status.as_u16()),
                format!("Failed to read Gemini response: {}", err.without_url()),
            )
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, &body_text));
        }

        decode_response(&body_text)
    }
}

#[async_trait]
impl AssistantClient for GeminiApiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        if !self.has_credential() {
            return Err(BlueprintError::config(
                "Gemini API key is not set (use --api-key, GEMINI_API_KEY or secret.json)",
            ));
        }

        let body = encode_request(&request);
        tracing::debug!(
            "[Gemini] generateContent model={} turns={} temperature={}",
            self.model,
            body.contents.len(),
            request.temperature
        );
        self.send_request(&body).await
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPayload {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn encode_turn(turn: &RequestTurn) -> Content {
    let role = match turn.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    };
    let parts = turn
        .parts
        .iter()
        .map(|part| match part {
            RequestPart::Text(text) => Part::Text { text: text.clone() },
            RequestPart::InlineData { mime_type, data } => Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        })
        .collect();
    Content {
        role: Some(role.to_string()),
        parts,
    }
}

/// Converts a domain request into the `generateContent` body.
pub fn encode_request(request: &GenerationRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: request.contents.iter().map(encode_turn).collect(),
        system_instruction: request.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part::Text { text: text.clone() }],
        }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
        },
    }
}

/// Extracts the reply text from a successful response body.
///
/// All text parts of the first candidate are concatenated. A response with
/// no text at all yields an empty string.
pub fn decode_response(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|err| {
        BlueprintError::delivery(None, format!("Failed to parse Gemini response: {err}"))
    })?;

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        tracing::warn!("[Gemini] Prompt was blocked: {}", reason);
    }

    let text = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        tracing::warn!("[Gemini] Response contained no text");
    }
    Ok(text)
}

/// Maps a non-success HTTP response to a delivery error, preferring the
/// structured `error.status: error.message` form when the body has one.
pub fn map_http_error(status: StatusCode, body: &str) -> BlueprintError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    BlueprintError::delivery(Some(status.as_u16()), message)
}
