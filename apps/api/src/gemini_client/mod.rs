/// Gemini client — the single point of entry for image-generation calls.
///
/// No other module talks to the generation endpoint directly. One call sends
/// the reference images followed by the compiled prompt as a single user turn
/// and returns the first inline image in the first candidate.
///
/// The API key travels only as the `key` query parameter and is never logged;
/// transport errors have their URL stripped before they are surfaced.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Gemini 2.5 Flash Image ("Nano Banana").
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Display is exactly the server-supplied message (or the status text).
    #[error("{message}")]
    Endpoint { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API response did not contain image data")]
    NoImage,
}

/// Base64 image data tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

/// A reference image sent to the endpoint.
pub type ImagePart = InlineImage;
/// The generated page returned by the endpoint.
pub type ImagePayload = InlineImage;

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: &'a InlineImage,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default, alias = "inline_data")]
    inline_data: Option<ResponseInlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    #[serde(default, alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, GenerationError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Sends `references` followed by `prompt` and returns the first inline
    /// image of the first candidate. Not retried.
    pub async fn generate(
        &self,
        references: &[ImagePart],
        prompt: &str,
        credential: &str,
    ) -> Result<ImagePayload, GenerationError> {
        let mut parts: Vec<RequestPart<'_>> = references
            .iter()
            .map(|image| RequestPart::InlineData { inline_data: image })
            .collect();
        parts.push(RequestPart::Text { text: prompt });

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts,
            }],
        };

        debug!(
            "Calling {} with {} reference images and a {}-char prompt",
            self.model,
            references.len(),
            prompt.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", credential)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Http(e.without_url()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .filter(|m| !m.is_empty())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| status.as_u16().to_string());
            warn!("Generation endpoint returned {}: {}", status, message);
            return Err(GenerationError::Endpoint {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&body)?;
        let image = extract_image(parsed)?;

        info!(
            "Generation succeeded: {} ({} base64 chars)",
            image.mime_type,
            image.data.len()
        );
        Ok(image)
    }
}

/// First part of the first candidate carrying non-empty inline data.
fn extract_image(response: GenerateContentResponse) -> Result<ImagePayload, GenerationError> {
    let parts = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .unwrap_or_default();

    for part in parts {
        if let Some(inline) = part.inline_data {
            if let Some(data) = inline.data.filter(|d| !d.is_empty()) {
                return Ok(InlineImage {
                    mime_type: inline
                        .mime_type
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
                    data,
                });
            }
        } else if let Some(text) = part.text {
            debug!(
                "Text part in response: {:?}",
                text.chars().take(200).collect::<String>()
            );
        }
    }

    Err(GenerationError::NoImage)
}
