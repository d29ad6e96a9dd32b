//! Query handlers for the interview context: read-only views of a session.

use recollect_core::image::ImageRef;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{InterviewSession, SessionMode};
use crate::domain::history::HistoryEntryView;
use crate::domain::keywords::KeywordPanelView;
use crate::domain::profile::{ContextParameters, RespondentProfile};
use crate::domain::questions::QuestionBoardView;
use crate::domain::scene::SceneKey;

/// One filled 5W1H answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicEntryView {
    /// Question label, e.g. "When".
    pub label: &'static str,
    /// The answer.
    pub value: String,
}

/// Context dials with their display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextView {
    /// Raw dial values.
    pub values: ContextParameters,
    /// Lighting label.
    pub light: &'static str,
    /// Crowd label.
    pub people: &'static str,
    /// Distance label.
    pub distance: &'static str,
    /// Camera angle derived from distance.
    pub camera_angle: &'static str,
}

/// Read-only view of an interview session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The respondent.
    pub profile: RespondentProfile,
    /// Filled 5W1H answers of the current scene, in display order.
    pub topic: Vec<TopicEntryView>,
    /// Context dials.
    pub context: ContextView,
    /// Working narrative.
    pub narrative: String,
    /// Key of the scene being worked on.
    pub current_key: Option<SceneKey>,
    /// Current illustration as a data URI.
    pub image_src: Option<String>,
    /// Current panorama as a data URI.
    pub panorama_src: Option<String>,
    /// Whether an illustration is on screen.
    pub has_image: bool,
    /// Whether the question and remix area is shown.
    pub interaction_visible: bool,
    /// Whether "expand to 360°" can be offered without generating.
    pub panorama_ready: bool,
    /// Keyword panel.
    pub keywords: KeywordPanelView,
    /// Question board.
    pub questions: QuestionBoardView,
    /// Number of committed scenes.
    pub history_len: usize,
    /// Number of interaction-log entries.
    pub log_len: usize,
    /// Whether a restore is in progress.
    pub restoring: bool,
}

/// Builds the full session view.
#[must_use]
pub fn get_session(session: &InterviewSession) -> SessionView {
    let state = session.state();
    let parameters = session.parameters();
    let presentation = session.presentation();
    SessionView {
        session_id: session.id,
        profile: session.profile().clone(),
        topic: session
            .topic()
            .entries()
            .into_iter()
            .map(|(label, value)| TopicEntryView {
                label,
                value: value.to_owned(),
            })
            .collect(),
        context: ContextView {
            values: parameters,
            light: parameters.light_label(),
            people: parameters.people_label(),
            distance: parameters.distance_label(),
            camera_angle: parameters.camera_angle(),
        },
        narrative: state.narrative.clone(),
        current_key: state.key,
        image_src: state.image.as_ref().map(ImageRef::data_uri),
        panorama_src: state.panorama.as_ref().map(ImageRef::data_uri),
        has_image: presentation.has_image,
        interaction_visible: presentation.interaction_visible,
        panorama_ready: state.panorama.is_some(),
        keywords: session.keyword_panel().render(),
        questions: session.questions().render(),
        history_len: session.history().len(),
        log_len: session.log().len(),
        restoring: session.mode() == SessionMode::Restoring,
    }
}

/// History list, most-recent-first.
#[must_use]
pub fn get_history(session: &InterviewSession) -> Vec<HistoryEntryView> {
    session.history().render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::SceneTopic;

    #[test]
    fn test_get_session_on_fresh_session() {
        // Arrange
        let session = InterviewSession::new(
            Uuid::new_v4(),
            RespondentProfile::default(),
            vec!["Where were you?".to_owned()],
            "English",
        );

        // Act
        let view = get_session(&session);

        // Assert
        assert_eq!(view.session_id, session.id);
        assert!(view.narrative.is_empty());
        assert!(view.image_src.is_none());
        assert!(!view.has_image);
        assert!(view.keywords.collapsed);
        assert_eq!(view.questions.planned, vec!["Where were you?".to_owned()]);
        assert!(!view.questions.reply_enabled);
        assert_eq!(view.context.camera_angle, "Medium Shot");
        assert_eq!(view.history_len, 0);
        assert!(get_history(&session).is_empty());
    }

    #[test]
    fn test_get_session_lists_topic_in_display_order() {
        // Arrange
        let mut session = InterviewSession::new(
            Uuid::new_v4(),
            RespondentProfile::default(),
            Vec::new(),
            "English",
        );
        session.topic = SceneTopic {
            who: Some("me".to_owned()),
            when: Some("yesterday".to_owned()),
            ..SceneTopic::default()
        };

        // Act
        let view = get_session(&session);

        // Assert
        let labels: Vec<&str> = view.topic.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["When", "Who"]);
    }
}
