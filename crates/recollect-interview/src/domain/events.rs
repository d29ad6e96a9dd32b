//! Interaction log for the interview context.
//!
//! The log records why the scene changed; the scene history records what it
//! looked like. Entries are appended in occurrence order and never removed.

use recollect_core::clock::Clock;
use recollect_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::keywords::KeywordSets;
use super::profile::SceneTopic;
use super::scene::SceneKey;

/// Event type of the first scene's entry.
pub const INITIAL_RESPONSE: &str = "interview.initial_response";
/// Event type of an answered deep question.
pub const QUESTION_ANSWER: &str = "interview.question_answer";
/// Event type of a visual remix.
pub const IMAGE_MODIFY: &str = "interview.image_modify";
/// Event type of a later scene started from scratch.
pub const SCENE_CREATE: &str = "interview.scene_create";

/// The respondent described the first scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialResponse {
    /// Key of the committed scene.
    pub scene: SceneKey,
    /// The 5W1H answers.
    pub topic: SceneTopic,
    /// Narrative generated from them.
    pub narrative: String,
    /// Keywords generated from them.
    pub keywords: KeywordSets,
}

/// The respondent answered a deep question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    /// Key of the committed scene.
    pub scene: SceneKey,
    /// The question as displayed.
    pub question: String,
    /// The respondent's answer.
    pub answer: String,
    /// Revised narrative.
    pub narrative: String,
    /// Revised keywords.
    pub keywords: KeywordSets,
}

/// The illustration was remixed without touching the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageModify {
    /// Key of the committed variation.
    pub scene: SceneKey,
    /// Instruction sent to the image collaborator.
    pub instruction: String,
    /// Whether the panorama was regenerated too.
    pub refresh_panorama: bool,
}

/// A further scene was started from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCreate {
    /// Key of the committed scene.
    pub scene: SceneKey,
    /// The 5W1H answers.
    pub topic: SceneTopic,
    /// Narrative generated from them.
    pub narrative: String,
    /// Keywords generated from them.
    pub keywords: KeywordSets,
}

/// Event payload variants for the interview context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionKind {
    /// First scene committed.
    InitialResponse(InitialResponse),
    /// Deep question answered.
    QuestionAnswer(QuestionAnswer),
    /// Image remixed.
    ImageModify(ImageModify),
    /// New scene committed.
    SceneCreate(SceneCreate),
}

impl InteractionKind {
    /// Short variant tag, e.g. `question_answer`.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::InitialResponse(_) => "initial_response",
            Self::QuestionAnswer(_) => "question_answer",
            Self::ImageModify(_) => "image_modify",
            Self::SceneCreate(_) => "scene_create",
        }
    }
}

/// Domain event envelope for the interview context.
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: InteractionKind,
}

impl DomainEvent for InteractionEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            InteractionKind::InitialResponse(_) => INITIAL_RESPONSE,
            InteractionKind::QuestionAnswer(_) => QUESTION_ANSWER,
            InteractionKind::ImageModify(_) => IMAGE_MODIFY,
            InteractionKind::SceneCreate(_) => SCENE_CREATE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

impl InteractionEvent {
    /// Renders the entry as a transcript block.
    #[must_use]
    pub fn transcript_block(&self) -> String {
        let mut out = format!(
            "[{}] #{} {}\n",
            self.metadata.occurred_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.metadata.sequence_number,
            self.kind.tag(),
        );
        match &self.kind {
            InteractionKind::InitialResponse(entry) => {
                push_topic(&mut out, entry.scene, &entry.topic);
                push_narrative(&mut out, &entry.narrative, &entry.keywords);
            }
            InteractionKind::SceneCreate(entry) => {
                push_topic(&mut out, entry.scene, &entry.topic);
                push_narrative(&mut out, &entry.narrative, &entry.keywords);
            }
            InteractionKind::QuestionAnswer(entry) => {
                out.push_str(&format!("Scene: {}\n", entry.scene));
                out.push_str(&format!("Q: {}\n", entry.question));
                out.push_str(&format!("A: {}\n", entry.answer));
                push_narrative(&mut out, &entry.narrative, &entry.keywords);
            }
            InteractionKind::ImageModify(entry) => {
                out.push_str(&format!("Scene: {}\n", entry.scene));
                out.push_str(&format!("Remix: {}\n", entry.instruction));
                out.push_str(&format!(
                    "Panorama refreshed: {}\n",
                    if entry.refresh_panorama { "yes" } else { "no" }
                ));
            }
        }
        out
    }
}

fn push_topic(out: &mut String, scene: SceneKey, topic: &SceneTopic) {
    out.push_str(&format!("Scene: {scene}\n"));
    for (label, value) in topic.entries() {
        out.push_str(&format!("{label}: {value}\n"));
    }
}

fn push_narrative(out: &mut String, narrative: &str, keywords: &KeywordSets) {
    out.push_str(&format!("Narrative: {narrative}\n"));
    out.push_str(&format!("Emotions: {}\n", keywords.emotions.join(", ")));
    out.push_str(&format!("Atmosphere: {}\n", keywords.atmosphere.join(", ")));
    out.push_str(&format!("Elements: {}\n", keywords.elements.join(", ")));
}

/// Append-only, ordered interaction log of one session.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    session_id: Uuid,
    entries: Vec<InteractionEvent>,
}

impl InteractionLog {
    /// An empty log for `session_id`.
    #[must_use]
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            entries: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.entries.len() as i64 + 1
    }

    /// Appends an entry produced by the command with `correlation_id`.
    pub fn append(
        &mut self,
        kind: InteractionKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> &InteractionEvent {
        let mut event = InteractionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: String::new(),
                session_id: self.session_id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        event.metadata.event_type = event.event_type().to_owned();
        self.entries.push(event);
        let index = self.entries.len() - 1;
        &self.entries[index]
    }

    /// Entries in occurrence order.
    #[must_use]
    pub fn entries(&self) -> &[InteractionEvent] {
        &self.entries
    }

    /// Variant tags in occurrence order.
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.kind.tag()).collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
