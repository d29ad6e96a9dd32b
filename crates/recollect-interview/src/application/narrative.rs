//! Narrative state manager: generates and revises the working narrative.
//!
//! Only successful, validated responses reach the session. A failed call
//! leaves narrative and keywords exactly as they were.

use recollect_core::error::DomainError;
use recollect_core::generation::{GenerationError, TextGenerator, TextRequest};
use serde::Deserialize;
use tracing::debug;

use crate::domain::aggregates::InterviewSession;
use crate::domain::keywords::KeywordSets;
use crate::domain::profile::SceneTopic;
use crate::domain::prompts;

/// A validated narrative with its keyword sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeResult {
    /// Normalised narrative text.
    pub narrative: String,
    /// Validated keyword sets.
    pub keywords: KeywordSets,
}

#[derive(Debug, Deserialize)]
struct RawNarrative {
    narrative: Option<String>,
    key_emotions: Option<Vec<String>>,
    atmosphere: Option<Vec<String>>,
    key_elements: Option<Vec<String>>,
}

/// Collapses line breaks (including `<br>` tags) and runs of whitespace into
/// single spaces.
#[must_use]
pub fn normalize_narrative(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let (before, tag) = rest.split_at(start);
        cleaned.push_str(before);
        match tag.find('>') {
            Some(end) if is_line_break(&tag[..=end]) => {
                cleaned.push(' ');
                rest = &tag[end + 1..];
            }
            _ => {
                cleaned.push('<');
                rest = &tag[1..];
            }
        }
    }
    cleaned.push_str(rest);
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_line_break(tag: &str) -> bool {
    let inner: String = tag[1..tag.len() - 1]
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '/')
        .collect();
    inner.eq_ignore_ascii_case("br")
}

/// Strips a Markdown code fence some backends wrap JSON in.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Validates a structured narrative response.
///
/// # Errors
///
/// Returns `GenerationError::InvalidResponse` for unparseable JSON,
/// `MissingField` for an absent or blank field, and `TooFewEntries` for a
/// keyword set with fewer than three usable labels.
pub fn parse_narrative_response(text: &str) -> Result<NarrativeResult, GenerationError> {
    let raw: RawNarrative = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
    let narrative = raw
        .narrative
        .map(|n| normalize_narrative(&n))
        .filter(|n| !n.is_empty())
        .ok_or(GenerationError::MissingField("narrative"))?;
    let keywords = KeywordSets::validated(
        raw.key_emotions
            .ok_or(GenerationError::MissingField("key_emotions"))?,
        raw.atmosphere
            .ok_or(GenerationError::MissingField("atmosphere"))?,
        raw.key_elements
            .ok_or(GenerationError::MissingField("key_elements"))?,
    )?;
    Ok(NarrativeResult {
        narrative,
        keywords,
    })
}

/// Reconstructs a scene narrative from the profile and a 5W1H topic and
/// makes it the working narrative.
///
/// # Errors
///
/// Returns `DomainError::Generation` if the call fails or the response does
/// not validate; the session is untouched in that case.
pub async fn generate_initial(
    session: &mut InterviewSession,
    text: &dyn TextGenerator,
    topic: &SceneTopic,
) -> Result<NarrativeResult, DomainError> {
    let prompt = prompts::scene_prompt(
        session.profile(),
        topic,
        session.questions().planned(),
        session.language(),
    );
    let request = TextRequest::structured(prompt, prompts::scene_schema(session.language()));
    let result = parse_narrative_response(&text.generate_text(request).await?)?;
    debug!(chars = result.narrative.chars().count(), "scene narrative generated");
    session.apply_narrative(result.narrative.clone(), result.keywords.clone());
    Ok(result)
}

/// Revises the working narrative with an answered question.
///
/// # Errors
///
/// Returns `DomainError::Validation` without calling the backend when the
/// narrative, question or answer is blank, and `DomainError::Generation`
/// when the call or validation fails.
pub async fn revise_with_answer(
    session: &mut InterviewSession,
    text: &dyn TextGenerator,
    question: &str,
    answer: &str,
) -> Result<NarrativeResult, DomainError> {
    let narrative = session.state().narrative.trim();
    if narrative.is_empty() {
        return Err(DomainError::Validation("there is no narrative to revise".into()));
    }
    let (question, answer) = (question.trim(), answer.trim());
    if question.is_empty() {
        return Err(DomainError::Validation("select a question first".into()));
    }
    if answer.is_empty() {
        return Err(DomainError::Validation("answer must not be empty".into()));
    }

    let prompt = prompts::revision_prompt(narrative, question, answer, session.language());
    let request = TextRequest::structured(prompt, prompts::scene_schema(session.language()));
    let result = parse_narrative_response(&text.generate_text(request).await?)?;
    debug!(chars = result.narrative.chars().count(), "narrative revised");
    session.apply_narrative(result.narrative.clone(), result.keywords.clone());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_core::generation::GenerationError;
    use recollect_test_support::{StubTextGenerator, narrative_json};
    use uuid::Uuid;

    use crate::domain::profile::RespondentProfile;
    use crate::domain::prompts::{NARRATIVE_REVISION, SCENE_RECONSTRUCTION};

    fn session() -> InterviewSession {
        InterviewSession::new(
            Uuid::new_v4(),
            RespondentProfile::default(),
            Vec::new(),
            "English",
        )
    }

    fn first_scene() -> String {
        narrative_json(
            "I waited<br/>at the   counter.",
            &["tense", "curious", "tired"],
            &["busy", "loud", "bright"],
            &["counter", "queue", "screen"],
        )
    }

    #[test]
    fn test_normalize_narrative_replaces_breaks() {
        assert_eq!(
            normalize_narrative("one<br>two<BR />three\n\n four < five"),
            "one two three four < five"
        );
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", first_scene());

        let result = parse_narrative_response(&fenced).unwrap();

        assert_eq!(result.narrative, "I waited at the counter.");
    }

    #[test]
    fn test_parse_rejects_missing_keywords() {
        let text = r#"{"narrative": "x", "atmosphere": ["a","b","c"], "key_elements": ["a","b","c"]}"#;

        let result = parse_narrative_response(text);

        assert_eq!(result, Err(GenerationError::MissingField("key_emotions")));
    }

    #[test]
    fn test_parse_rejects_blank_narrative() {
        let text = narrative_json("  <br> ", &["a", "b", "c"], &["a", "b", "c"], &["a", "b", "c"]);

        let result = parse_narrative_response(&text);

        assert_eq!(result, Err(GenerationError::MissingField("narrative")));
    }

    #[tokio::test]
    async fn test_generate_initial_updates_state_and_opens_panel() {
        // Arrange
        let mut session = session();
        let text = StubTextGenerator::new().respond_to(SCENE_RECONSTRUCTION, vec![Ok(first_scene())]);

        // Act
        let result = generate_initial(&mut session, &text, &SceneTopic::default())
            .await
            .unwrap();

        // Assert
        assert_eq!(session.state().narrative, "I waited at the counter.");
        assert_eq!(session.state().keywords, result.keywords);
        assert!(!session.keyword_panel().is_collapsed());
        assert!(text.requests()[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn test_second_generation_with_empty_emotions_keeps_first_keywords() {
        // Arrange
        let mut session = session();
        let text = StubTextGenerator::new().respond_to(
            SCENE_RECONSTRUCTION,
            vec![
                Ok(first_scene()),
                Ok(narrative_json("Later.", &[], &["a", "b", "c"], &["a", "b", "c"])),
            ],
        );
        generate_initial(&mut session, &text, &SceneTopic::default())
            .await
            .unwrap();
        let before = session.state().clone();
        let panel_before = session.keyword_panel().render();

        // Act
        let result = generate_initial(&mut session, &text, &SceneTopic::default()).await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::Generation(GenerationError::TooFewEntries {
                field: "key_emotions",
                ..
            }))
        ));
        assert_eq!(session.state(), &before);
        assert_eq!(session.keyword_panel().render(), panel_before);
    }

    #[tokio::test]
    async fn test_revise_requires_answer_without_calling_backend() {
        // Arrange
        let mut session = session();
        let text = StubTextGenerator::new().respond_to(SCENE_RECONSTRUCTION, vec![Ok(first_scene())]);
        generate_initial(&mut session, &text, &SceneTopic::default())
            .await
            .unwrap();

        // Act
        let result = revise_with_answer(&mut session, &text, "What did you see?", "   ").await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(text.calls_to(NARRATIVE_REVISION), 0);
    }

    #[tokio::test]
    async fn test_revise_replaces_narrative_in_place() {
        // Arrange
        let mut session = session();
        let text = StubTextGenerator::new()
            .respond_to(SCENE_RECONSTRUCTION, vec![Ok(first_scene())])
            .respond_to(
                NARRATIVE_REVISION,
                vec![Ok(narrative_json(
                    "I waited and wished someone would help.",
                    &["lonely", "tense", "hopeful"],
                    &["busy", "loud", "cold"],
                    &["counter", "queue", "clerk"],
                ))],
            );
        generate_initial(&mut session, &text, &SceneTopic::default())
            .await
            .unwrap();

        // Act
        revise_with_answer(
            &mut session,
            &text,
            "What would have helped?",
            "It would have been nice if someone had helped me.",
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(
            session.state().narrative,
            "I waited and wished someone would help."
        );
        let prompt = &text.requests()[1].prompt;
        assert!(prompt.contains("I waited at the counter."));
        assert!(prompt.contains("It would have been nice if someone had helped me."));
    }
}
