//! Interaction-log event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every interaction-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `interview.question_answer`.
    pub event_type: String,
    /// Interview session this entry belongs to.
    pub session_id: Uuid,
    /// Monotonically increasing position within the session log.
    pub sequence_number: i64,
    /// Correlation ID of the command that produced the entry.
    pub correlation_id: Uuid,
    /// Causation ID linking this entry to the event/command that caused it.
    pub causation_id: Uuid,
    /// Timestamp of entry creation.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all interaction-log entries implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
