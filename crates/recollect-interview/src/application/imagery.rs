//! Illustrations, in-place edits, panoramas and context suggestions.

use recollect_core::error::DomainError;
use recollect_core::generation::{
    AspectRatio, GenerationError, ImageGenerator, ImageRequest, TextGenerator, TextRequest,
};
use recollect_core::image::ImageRef;
use serde::Deserialize;
use tracing::{debug, warn};

use super::narrative::strip_code_fence;
use crate::domain::aggregates::InterviewSession;
use crate::domain::panorama::PanoramaCache;
use crate::domain::profile::{ContextParameters, Level};
use crate::domain::prompts;

/// An image together with the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    /// The image.
    pub image: ImageRef,
    /// The exact prompt sent.
    pub prompt: String,
}

/// Draws a fresh 16:9 illustration of the working narrative.
///
/// # Errors
///
/// Returns `GenerationError` if the backend fails or returns no image.
pub async fn illustrate(
    generator: &dyn ImageGenerator,
    session: &InterviewSession,
) -> Result<Illustration, GenerationError> {
    let prompt = prompts::illustration_prompt(
        session.profile(),
        &session.state().narrative,
        &session.parameters(),
    );
    let image = generator
        .generate_image(ImageRequest {
            prompt: prompt.clone(),
            reference: None,
            aspect_ratio: AspectRatio::Widescreen,
        })
        .await?;
    Ok(Illustration { image, prompt })
}

/// Edits the current illustration in place following `instruction`.
///
/// # Errors
///
/// Returns `DomainError::NoSceneCommitted` if there is no image to edit and
/// `DomainError::Generation` if the backend fails.
pub async fn edit_in_place(
    generator: &dyn ImageGenerator,
    session: &InterviewSession,
    instruction: &str,
) -> Result<Illustration, DomainError> {
    let reference = session
        .state()
        .image
        .clone()
        .ok_or(DomainError::NoSceneCommitted)?;
    let prompt = prompts::edit_prompt(
        session.profile(),
        &session.state().narrative,
        instruction,
        &session.parameters(),
    );
    let image = generator
        .generate_image(ImageRequest {
            prompt: prompt.clone(),
            reference: Some(reference),
            aspect_ratio: AspectRatio::Widescreen,
        })
        .await?;
    Ok(Illustration { image, prompt })
}

async fn generate_panorama(
    generator: &dyn ImageGenerator,
    narrative: &str,
    location: &str,
    revision: Option<&str>,
) -> Result<ImageRef, GenerationError> {
    generator
        .generate_image(ImageRequest {
            prompt: prompts::panorama_prompt(location, narrative, revision),
            reference: None,
            aspect_ratio: AspectRatio::Equirectangular,
        })
        .await
}

/// Returns the cached panorama for `scene`, generating and caching one on a
/// miss.
///
/// # Errors
///
/// Returns `GenerationError` if a miss could not be filled.
pub async fn get_or_create_panorama(
    generator: &dyn ImageGenerator,
    cache: &mut PanoramaCache,
    scene: u32,
    narrative: &str,
    location: &str,
    revision: Option<&str>,
) -> Result<ImageRef, GenerationError> {
    if let Some(hit) = cache.get(scene) {
        debug!(scene, "panorama cache hit");
        return Ok(hit.clone());
    }
    let panorama = generate_panorama(generator, narrative, location, revision).await?;
    cache.insert(scene, panorama.clone());
    Ok(panorama)
}

/// Regenerates the panorama for `scene`, bypassing the cache and
/// overwriting it on success.
///
/// # Errors
///
/// Returns `GenerationError` if generation fails; the cache keeps its
/// previous entry.
pub async fn refresh_panorama(
    generator: &dyn ImageGenerator,
    cache: &mut PanoramaCache,
    scene: u32,
    narrative: &str,
    location: &str,
    revision: Option<&str>,
) -> Result<ImageRef, GenerationError> {
    let panorama = generate_panorama(generator, narrative, location, revision).await?;
    cache.insert(scene, panorama.clone());
    Ok(panorama)
}

#[derive(Debug, Deserialize)]
struct RawContext {
    light: i64,
    people: i64,
    distance: i64,
}

/// Asks the backend which context dials fit `narrative`. Any failure or
/// out-of-range value yields `None`.
pub async fn suggest_context(
    text: &dyn TextGenerator,
    narrative: &str,
) -> Option<ContextParameters> {
    let request = TextRequest::structured(
        prompts::context_prompt(narrative),
        prompts::context_schema(),
    );
    let response = match text.generate_text(request).await {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, "context suggestion failed");
            return None;
        }
    };
    let parsed = match serde_json::from_str::<RawContext>(strip_code_fence(&response)) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(%error, "context suggestion was not valid JSON");
            return None;
        }
    };
    let suggestion = Level::from_step(parsed.light)
        .zip(Level::from_step(parsed.people))
        .zip(Level::from_step(parsed.distance))
        .map(|((light, people), distance)| ContextParameters {
            light,
            people,
            distance,
        });
    if suggestion.is_none() {
        warn!(
            light = parsed.light,
            people = parsed.people,
            distance = parsed.distance,
            "context suggestion out of range"
        );
    }
    suggestion
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_test_support::{StubImageGenerator, StubTextGenerator};
    use uuid::Uuid;

    use crate::domain::profile::RespondentProfile;
    use crate::domain::prompts::CONTEXT_PARAMETERS;

    #[tokio::test]
    async fn test_panorama_cache_hit_skips_backend() {
        // Arrange
        let generator = StubImageGenerator::new();
        let mut cache = PanoramaCache::default();
        let first = get_or_create_panorama(&generator, &mut cache, 1, "n", "cafe", None)
            .await
            .unwrap();

        // Act
        let second = get_or_create_panorama(&generator, &mut cache, 1, "other", "cafe", None)
            .await
            .unwrap();

        // Assert
        assert_eq!(first, second);
        assert_eq!(generator.panorama_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_cache_only_on_success() {
        // Arrange
        let mut cache = PanoramaCache::default();
        let working = StubImageGenerator::new();
        let original = get_or_create_panorama(&working, &mut cache, 1, "n", "cafe", None)
            .await
            .unwrap();
        let broken = StubImageGenerator::new().failing_panoramas();

        // Act
        let failed = refresh_panorama(&broken, &mut cache, 1, "n", "cafe", Some("dusk")).await;
        let refreshed = refresh_panorama(&working, &mut cache, 1, "n", "cafe", Some("dusk"))
            .await
            .unwrap();

        // Assert
        assert!(failed.is_err());
        assert_ne!(refreshed, original);
        assert_eq!(cache.get(1), Some(&refreshed));
        assert!(working.requests()[1].prompt.contains("dusk"));
    }

    #[tokio::test]
    async fn test_edit_in_place_sends_reference_image() {
        // Arrange
        let generator = StubImageGenerator::new();
        let mut session = InterviewSession::new(
            Uuid::new_v4(),
            RespondentProfile::default(),
            Vec::new(),
            "English",
        );
        let current = ImageRef::from_bytes("image/png", b"current").unwrap();
        session.state.image = Some(current.clone());

        // Act
        let edited = edit_in_place(&generator, &session, "make it rain").await.unwrap();

        // Assert
        let request = &generator.requests()[0];
        assert_eq!(request.reference.as_ref(), Some(&current));
        assert_eq!(request.aspect_ratio, AspectRatio::Widescreen);
        assert_eq!(edited.prompt, request.prompt);
        assert!(edited.prompt.contains("make it rain"));
    }

    #[tokio::test]
    async fn test_suggest_context_ignores_out_of_range_values() {
        let text = StubTextGenerator::new().respond_to(
            CONTEXT_PARAMETERS,
            vec![Ok(r#"{"light": 3, "people": 1, "distance": 0}"#.to_owned())],
        );

        assert_eq!(suggest_context(&text, "n").await, None);
    }

    #[tokio::test]
    async fn test_suggest_context_parses_levels() {
        let text = StubTextGenerator::new().respond_to(
            CONTEXT_PARAMETERS,
            vec![Ok(r#"{"light": 0, "people": 2, "distance": 1}"#.to_owned())],
        );

        let suggestion = suggest_context(&text, "n").await.unwrap();

        assert_eq!(suggestion.light, Level::Low);
        assert_eq!(suggestion.people, Level::High);
        assert_eq!(suggestion.distance, Level::Medium);
    }
}
