//! Commands for the interview context.

use recollect_core::command::Command;
use uuid::Uuid;

use super::profile::{ContextParameters, RespondentProfile, SceneTopic};
use super::scene::SceneId;

/// Command to start a fresh interview session.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The respondent being interviewed.
    pub profile: RespondentProfile,
    /// Questions the researcher prepared beforehand.
    pub planned_questions: Vec<String>,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "interview.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to generate and commit a scene from a 5W1H topic.
#[derive(Debug, Clone)]
pub struct CommitScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The respondent's 5W1H answers.
    pub topic: SceneTopic,
    /// Context dials to apply before generating, if the researcher set them.
    pub parameters: Option<ContextParameters>,
}

impl Command for CommitScene {
    fn command_type(&self) -> &'static str {
        "interview.commit_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to select a displayed deep question.
#[derive(Debug, Clone)]
pub struct SelectQuestion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Question text as displayed.
    pub question: String,
}

impl Command for SelectQuestion {
    fn command_type(&self) -> &'static str {
        "interview.select_question"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to answer the selected deep question.
#[derive(Debug, Clone)]
pub struct SubmitAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The respondent's answer.
    pub answer: String,
}

impl Command for SubmitAnswer {
    fn command_type(&self) -> &'static str {
        "interview.submit_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remix the current illustration without touching the narrative.
#[derive(Debug, Clone)]
pub struct RemixImage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Free-text visual change; blank falls back to the context dials.
    pub instruction: String,
    /// Context dials to apply before remixing, if changed.
    pub parameters: Option<ContextParameters>,
    /// Regenerate the scene's panorama as well.
    pub refresh_panorama: bool,
}

impl Command for RemixImage {
    fn command_type(&self) -> &'static str {
        "interview.remix_image"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to load a committed scene back into the working state.
#[derive(Debug, Clone)]
pub struct RestoreScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The record to restore.
    pub scene_id: SceneId,
}

impl Command for RestoreScene {
    fn command_type(&self) -> &'static str {
        "interview.restore_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to show the current scene as a 360° panorama.
#[derive(Debug, Clone)]
pub struct ExpandPanorama {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for ExpandPanorama {
    fn command_type(&self) -> &'static str {
        "interview.expand_panorama"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
