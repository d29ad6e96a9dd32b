//! `generateContent` request and response bodies.

use recollect_core::generation::{
    AspectRatio, GenerationError, ImageRequest, PromptRole, TextRequest,
};
use recollect_core::image::ImageRef;
use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; the engine always sends exactly one.
    pub contents: Vec<Content>,
    /// System instruction, for system-role prompts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Output constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One turn of content.
#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`; absent on system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text and inline-data parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A text or inline-data part.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 binary content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload with its MIME type.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64 data.
    pub data: String,
}

/// Generation settings.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

/// Image output settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// e.g. `16:9`.
    pub aspect_ratio: &'static str,
}

/// Response body of `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

fn text_part(text: String) -> Part {
    Part {
        text: Some(text),
        inline_data: None,
    }
}

fn user_turn(parts: Vec<Part>) -> Content {
    Content {
        role: Some("user".to_owned()),
        parts,
    }
}

/// Builds the body for a text request. System-role prompts travel as the
/// system instruction with an empty user turn.
#[must_use]
pub fn text_body(request: TextRequest) -> GenerateContentRequest {
    let generation_config = request.response_schema.map(|schema| GenerationConfig {
        response_mime_type: Some("application/json"),
        response_schema: Some(schema),
        ..GenerationConfig::default()
    });
    match request.role {
        PromptRole::User => GenerateContentRequest {
            contents: vec![user_turn(vec![text_part(request.prompt)])],
            system_instruction: None,
            generation_config,
        },
        PromptRole::System => GenerateContentRequest {
            contents: vec![user_turn(vec![text_part(String::new())])],
            system_instruction: Some(Content {
                role: None,
                parts: vec![text_part(request.prompt)],
            }),
            generation_config,
        },
    }
}

/// `imageConfig` only accepts the backend's fixed ratio list, which has no
/// 2:1; panoramas get their ratio from the prompt instead.
fn image_config(aspect_ratio: AspectRatio) -> Option<ImageConfig> {
    match aspect_ratio {
        AspectRatio::Widescreen => Some(ImageConfig {
            aspect_ratio: aspect_ratio.as_str(),
        }),
        AspectRatio::Equirectangular => None,
    }
}

/// Builds the body for an image request. The reference image, when present,
/// is sent ahead of the prompt for in-place editing.
#[must_use]
pub fn image_body(request: ImageRequest) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(reference) = &request.reference {
        parts.push(Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: reference.mime_type().to_owned(),
                data: reference.base64().to_owned(),
            }),
        });
    }
    parts.push(text_part(request.prompt));
    GenerateContentRequest {
        contents: vec![user_turn(parts)],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE"]),
            image_config: image_config(request.aspect_ratio),
            ..GenerationConfig::default()
        }),
    }
}

fn first_parts(response: GenerateContentResponse) -> Result<Vec<Part>, GenerationError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::InvalidResponse(format!(
            "prompt blocked: {reason}"
        )));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("no candidates in response".to_owned()))?;
    match candidate.content {
        Some(content) => Ok(content.parts),
        None => Err(GenerationError::InvalidResponse(format!(
            "candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}

/// Concatenates the text parts of the first candidate.
///
/// # Errors
///
/// Returns `GenerationError::InvalidResponse` when there is no candidate or
/// no text at all.
pub fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text: String = first_parts(response)?
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    if text.trim().is_empty() {
        return Err(GenerationError::InvalidResponse(
            "response contained no text".to_owned(),
        ));
    }
    Ok(text)
}

/// Returns the first inline image of the first candidate.
///
/// # Errors
///
/// Returns `GenerationError::EmptyImage` when the candidate carries no image.
pub fn extract_image(response: GenerateContentResponse) -> Result<ImageRef, GenerationError> {
    let data = first_parts(response)?
        .into_iter()
        .find_map(|part| part.inline_data)
        .ok_or(GenerationError::EmptyImage)?;
    ImageRef::from_base64(data.mime_type, data.data)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_structured_text_body_requests_json() {
        // Arrange
        let request = TextRequest::structured("describe", json!({"type": "OBJECT"}));

        // Act
        let body = serde_json::to_value(text_body(request)).unwrap();

        // Assert
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_plain_text_body_has_no_generation_config() {
        let body = serde_json::to_value(text_body(TextRequest::text("hi"))).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_edit_body_sends_reference_before_prompt() {
        // Arrange
        let reference = ImageRef::from_bytes("image/png", b"pixels").unwrap();
        let request = ImageRequest {
            prompt: "make it rain".to_owned(),
            reference: Some(reference.clone()),
            aspect_ratio: AspectRatio::Widescreen,
        };

        // Act
        let body = serde_json::to_value(image_body(request)).unwrap();

        // Assert
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], reference.base64());
        assert_eq!(parts[1]["text"], "make it rain");
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
    }

    #[test]
    fn test_panorama_body_omits_image_config() {
        let request = ImageRequest {
            prompt: "room".to_owned(),
            reference: None,
            aspect_ratio: AspectRatio::Equirectangular,
        };
        let body = serde_json::to_value(image_body(request)).unwrap();
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert!(body["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        // Arrange
        let body = response(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        }));

        // Act
        let text = extract_text(body).unwrap();

        // Assert
        assert_eq!(text, "{\"a\":1}");
    }

    #[test]
    fn test_extract_image_skips_text_parts() {
        // Arrange
        let body = response(json!({
            "candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": "image/jpeg", "data": "AAEC"}}
            ]}}]
        }));

        // Act
        let image = extract_image(body).unwrap();

        // Assert
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.base64(), "AAEC");
    }

    #[test]
    fn test_text_only_image_response_is_empty_image() {
        let body = response(json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]
        }));
        assert_eq!(extract_image(body), Err(GenerationError::EmptyImage));
    }

    #[test]
    fn test_blocked_prompt_is_invalid_response() {
        let body = response(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(matches!(
            extract_text(body),
            Err(GenerationError::InvalidResponse(message)) if message.contains("SAFETY")
        ));
    }

    #[test]
    fn test_missing_candidates_is_invalid_response() {
        let body = response(json!({}));
        assert!(matches!(
            extract_image(body),
            Err(GenerationError::InvalidResponse(_))
        ));
    }
}
