//! Ports to the generative text/image backend.
//!
//! The engine treats generation as a probabilistic external service: it
//! builds prompts, sends them through these traits and validates whatever
//! comes back. Timeouts and retries belong to the adapter's HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::ImageRef;

/// Errors surfaced by generation adapters and response validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request never produced a usable HTTP response.
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    /// The backend answered, but the body could not be interpreted.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    /// A structured response lacked a required field or left it empty.
    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),

    /// A keyword array had fewer entries than the contract requires.
    #[error("field `{field}` has {found} usable entries, at least {required} required")]
    TooFewEntries {
        /// The offending field.
        field: &'static str,
        /// Usable entries found.
        found: usize,
        /// Minimum required.
        required: usize,
    },

    /// An image response carried no image content.
    #[error("response contained no image")]
    EmptyImage,
}

/// Role the collaborator is asked to play; adapters map it onto the
/// backend's message roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptRole {
    /// A plain user turn.
    User,
    /// System-level instruction.
    System,
}

/// Request for a text completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRequest {
    /// Message role for the prompt.
    pub role: PromptRole,
    /// Full prompt text.
    pub prompt: String,
    /// Optional JSON output schema; when set the backend must answer in JSON.
    pub response_schema: Option<serde_json::Value>,
}

impl TextRequest {
    /// A free-text request.
    #[must_use]
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    /// A request constrained to JSON matching `schema`.
    #[must_use]
    pub fn structured(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            role: PromptRole::User,
            prompt: prompt.into(),
            response_schema: Some(schema),
        }
    }
}

/// Aspect-ratio hint for image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Scene illustrations.
    #[serde(rename = "16:9")]
    Widescreen,
    /// Equirectangular panoramas.
    #[serde(rename = "2:1")]
    Equirectangular,
}

impl AspectRatio {
    /// The ratio as the backend expects it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Widescreen => "16:9",
            Self::Equirectangular => "2:1",
        }
    }
}

/// Request for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Image to edit in place, if any.
    pub reference: Option<ImageRef>,
    /// Aspect-ratio hint.
    pub aspect_ratio: AspectRatio,
}

/// Port for text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for the request. Structured requests return the raw
    /// JSON text; validation is the caller's job.
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError>;
}

/// Port for image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates (or edits, when `reference` is set) an image.
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageRef, GenerationError>;
}
