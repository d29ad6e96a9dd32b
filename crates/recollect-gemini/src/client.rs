//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use recollect_core::generation::{
    GenerationError, ImageGenerator, ImageRequest, TextGenerator, TextRequest,
};
use recollect_core::image::ImageRef;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::wire::{self, GenerateContentRequest, GenerateContentResponse};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for narratives, questions and context suggestions.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for illustrations, edits and panoramas.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Image generation is slow; requests get two minutes by default.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,
    /// API root without trailing slash.
    pub base_url: String,
    /// Model used for text requests.
    pub text_model: String,
    /// Model used for image requests.
    pub image_model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Settings with default models and endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            text_model: DEFAULT_TEXT_MODEL.to_owned(),
            image_model: DEFAULT_IMAGE_MODEL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Gemini-backed text and image generator.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client; the timeout applies to every request.
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            text_model: config.text_model,
            image_model: config.image_model,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;
            return Err(GenerationError::RequestFailed(format!(
                "{status}: {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.text_model, structured = request.response_schema.is_some()))]
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        let body = wire::text_body(request);
        let response = self.generate_content(&self.text_model, &body).await?;
        let text = wire::extract_text(response)?;
        debug!(chars = text.len(), "text generated");
        Ok(text)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.image_model, edit = request.reference.is_some(), aspect_ratio = request.aspect_ratio.as_str()))]
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageRef, GenerationError> {
        let body = wire::image_body(request);
        let response = self.generate_content(&self.image_model, &body).await?;
        let image = wire::extract_image(response)?;
        debug!(mime_type = image.mime_type(), "image generated");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        // Arrange
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://localhost:8080/".to_owned();

        // Act
        let client = GeminiClient::new(config);

        // Assert
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_output_hides_api_key() {
        let client = GeminiClient::new(GeminiConfig::new("secret-key"));
        assert!(!format!("{client:?}").contains("secret-key"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_failed() {
        // Arrange
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://127.0.0.1:9".to_owned();
        config.timeout = Duration::from_secs(2);
        let client = GeminiClient::new(config);

        // Act
        let result = client.generate_text(TextRequest::text("hello")).await;

        // Assert
        assert!(matches!(result, Err(GenerationError::RequestFailed(_))));
    }
}
