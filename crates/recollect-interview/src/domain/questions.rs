//! Deep questions: parsing generator output and tracking the selection.

use recollect_core::error::DomainError;
use serde::Serialize;

/// Number of deep questions shown per turn.
pub const QUESTIONS_PER_TURN: usize = 3;

/// Placeholder shown when no questions could be produced.
pub const QUESTIONS_UNAVAILABLE: &str =
    "Follow-up questions could not be generated. Continue with your own question.";

/// Outcome of a deep-question request. Never an error: a failure degrades to
/// a single placeholder entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuestionBatch {
    /// Exactly three usable questions.
    Ready {
        /// The questions, in generator order.
        questions: [String; QUESTIONS_PER_TURN],
    },
    /// Generation failed or produced fewer than three questions.
    Unavailable {
        /// Text shown in place of the questions.
        placeholder: String,
    },
}

impl QuestionBatch {
    /// The degraded batch.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::Unavailable {
            placeholder: QUESTIONS_UNAVAILABLE.to_owned(),
        }
    }

    /// Selectable questions; empty when unavailable.
    #[must_use]
    pub fn questions(&self) -> &[String] {
        match self {
            Self::Ready { questions } => questions,
            Self::Unavailable { .. } => &[],
        }
    }
}

/// Splits free text into lines, strips numbering and bullets, and keeps the
/// first three non-empty questions. Anything short of three yields `None`.
#[must_use]
pub fn parse_questions(text: &str) -> Option<[String; QUESTIONS_PER_TURN]> {
    let usable: Vec<String> = text
        .lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty())
        .take(QUESTIONS_PER_TURN)
        .map(str::to_owned)
        .collect();
    usable.try_into().ok()
}

fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }
    let rest = &line[digits..];
    match rest.chars().next() {
        Some('.' | ')' | ':') => rest[1..].trim_start(),
        Some(c) if c.is_whitespace() => rest.trim_start(),
        _ => line,
    }
}

/// The questions on display plus the one currently selected.
#[derive(Debug, Clone, Default)]
pub struct QuestionBoard {
    planned: Vec<String>,
    generated: Option<QuestionBatch>,
    selected: Option<String>,
}

/// Rendered question board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBoardView {
    /// Questions prepared before the interview.
    pub planned: Vec<String>,
    /// Latest generated batch, if any.
    pub generated: Option<QuestionBatch>,
    /// The selected question.
    pub selected: Option<String>,
    /// Whether the answer surface accepts input.
    pub reply_enabled: bool,
}

impl QuestionBoard {
    /// A board showing the researcher's planned questions.
    #[must_use]
    pub fn with_planned(planned: Vec<String>) -> Self {
        Self {
            planned: planned
                .into_iter()
                .map(|q| q.trim().to_owned())
                .filter(|q| !q.is_empty())
                .collect(),
            ..Self::default()
        }
    }

    /// Planned questions.
    #[must_use]
    pub fn planned(&self) -> &[String] {
        &self.planned
    }

    /// Latest generated batch.
    #[must_use]
    pub fn generated(&self) -> Option<&QuestionBatch> {
        self.generated.as_ref()
    }

    /// Replaces the generated batch.
    pub fn show_generated(&mut self, batch: QuestionBatch) {
        self.generated = Some(batch);
    }

    /// Selects a displayed question by exact trimmed text and returns the
    /// stored text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if no displayed question matches.
    pub fn select(&mut self, question: &str) -> Result<&str, DomainError> {
        let wanted = question.trim();
        if wanted.is_empty() {
            return Err(DomainError::Validation("question must not be empty".into()));
        }
        let generated = self.generated.as_ref().map(QuestionBatch::questions).unwrap_or_default();
        let found = self
            .planned
            .iter()
            .chain(generated)
            .find(|q| q.trim() == wanted)
            .cloned()
            .ok_or_else(|| {
                DomainError::Validation(format!("question is not on display: {wanted}"))
            })?;
        Ok(self.selected.insert(found).as_str())
    }

    /// Currently selected question.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Clears the selection, disabling the answer surface.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Renders the board.
    #[must_use]
    pub fn render(&self) -> QuestionBoardView {
        QuestionBoardView {
            planned: self.planned.clone(),
            generated: self.generated.clone(),
            selected: self.selected.clone(),
            reply_enabled: self.selected.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_numbering_and_keeps_three() {
        // Arrange
        let text = "1. What did you see first?\n\n2) Who was next to you?\n- How did it end?\n4. Extra?";

        // Act
        let parsed = parse_questions(text).unwrap();

        // Assert
        assert_eq!(
            parsed,
            [
                "What did you see first?".to_owned(),
                "Who was next to you?".to_owned(),
                "How did it end?".to_owned(),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_fewer_than_three() {
        assert_eq!(parse_questions("Only one?\n\n  \n2. And two?"), None);
        assert_eq!(parse_questions(""), None);
    }

    #[test]
    fn test_parse_keeps_leading_numbers_that_are_content() {
        let parsed = parse_questions("3pm felt late?\nWhy?\nHow?").unwrap();

        assert_eq!(parsed[0], "3pm felt late?");
    }

    #[test]
    fn test_select_matches_planned_and_generated() {
        // Arrange
        let mut board = QuestionBoard::with_planned(vec!["What happened first?".to_owned()]);
        board.show_generated(QuestionBatch::Ready {
            questions: ["A?".to_owned(), "B?".to_owned(), "C?".to_owned()],
        });

        // Act
        let planned = board.select("  What happened first? ").unwrap().to_owned();
        let generated = board.select("B?").unwrap().to_owned();

        // Assert
        assert_eq!(planned, "What happened first?");
        assert_eq!(generated, "B?");
        assert_eq!(board.selected(), Some("B?"));
        assert!(board.render().reply_enabled);
    }

    #[test]
    fn test_select_unknown_question_fails_and_keeps_selection() {
        // Arrange
        let mut board = QuestionBoard::with_planned(vec!["Known?".to_owned()]);
        board.select("Known?").unwrap();

        // Act
        let result = board.select("Unknown?");

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(board.selected(), Some("Known?"));
    }

    #[test]
    fn test_unavailable_batch_offers_nothing_to_select() {
        let mut board = QuestionBoard::default();
        board.show_generated(QuestionBatch::unavailable());

        assert!(board.select(QUESTIONS_UNAVAILABLE).is_err());
    }
}
