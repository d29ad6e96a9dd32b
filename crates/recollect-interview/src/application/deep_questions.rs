//! Deep-question generation. Failures degrade to a placeholder batch.

use recollect_core::generation::{TextGenerator, TextRequest};
use tracing::warn;

use crate::domain::prompts;
use crate::domain::questions::{QuestionBatch, parse_questions};

/// Asks the backend for three follow-up questions about `narrative`.
pub async fn generate_questions(
    text: &dyn TextGenerator,
    narrative: &str,
    language: &str,
) -> QuestionBatch {
    let request = TextRequest::text(prompts::questions_prompt(narrative, language));
    match text.generate_text(request).await {
        Ok(response) => parse_questions(&response).map_or_else(
            || {
                warn!("deep-question response had fewer than three questions");
                QuestionBatch::unavailable()
            },
            |questions| QuestionBatch::Ready { questions },
        ),
        Err(error) => {
            warn!(%error, "deep-question generation failed");
            QuestionBatch::unavailable()
        }
    }
}
