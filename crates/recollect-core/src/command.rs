//! Command abstractions.

use uuid::Uuid;

/// Trait that all interview commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;

    /// Correlation ID linking the command to the log entries it produces.
    fn correlation_id(&self) -> Uuid;
}
