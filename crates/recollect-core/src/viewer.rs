//! Viewer context port and wire messages.

use serde::{Deserialize, Serialize};

/// Port to a viewer context.
///
/// Contract: sends are fire-and-forget. Implementations never block, never
/// retry, and silently drop the message when nobody is listening. Callers
/// check `is_connected` first so the no-op is explicit rather than an
/// incidental error.
pub trait ViewerChannel: Send + Sync {
    /// Whether a viewer is currently open and subscribed.
    fn is_connected(&self) -> bool;

    /// Posts a message without waiting for delivery.
    fn post(&self, message: ViewerMessage);
}

/// Messages the viewer context understands. Serialized as JSON objects
/// tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewerMessage {
    /// Show or hide the viewer's loading overlay.
    ToggleLoading {
        /// `true` to show the overlay.
        value: bool,
    },
    /// Replace everything the viewer shows in one update.
    #[serde(rename_all = "camelCase")]
    SyncAll {
        /// Current narrative text.
        narrative: String,
        /// Currently selected question, empty when none.
        question: String,
        /// All keyword sets rendered as `#label` tags.
        parameters: Vec<String>,
        /// Panorama data URI, when one exists.
        panorama_src: Option<String>,
        /// Illustration data URI, when one exists.
        image_src: Option<String>,
    },
    /// Update only the displayed question.
    SyncQuestion {
        /// The selected question.
        question: String,
    },
}

impl ViewerMessage {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToggleLoading { .. } => "toggleLoading",
            Self::SyncAll { .. } => "syncAll",
            Self::SyncQuestion { .. } => "syncQuestion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_all_serializes_with_camel_case_tag_and_fields() {
        // Arrange
        let message = ViewerMessage::SyncAll {
            narrative: "I waited at the counter.".to_owned(),
            question: String::new(),
            parameters: vec!["#tense".to_owned()],
            panorama_src: Some("data:image/png;base64,AA".to_owned()),
            image_src: None,
        };

        // Act
        let json = serde_json::to_value(&message).unwrap();

        // Assert
        assert_eq!(json["type"], "syncAll");
        assert_eq!(json["narrative"], "I waited at the counter.");
        assert_eq!(json["parameters"][0], "#tense");
        assert_eq!(json["panoramaSrc"], "data:image/png;base64,AA");
        assert!(json["imageSrc"].is_null());
    }

    #[test]
    fn test_toggle_loading_serializes_value() {
        let json = serde_json::to_value(ViewerMessage::ToggleLoading { value: true }).unwrap();

        assert_eq!(json, serde_json::json!({ "type": "toggleLoading", "value": true }));
    }
}
