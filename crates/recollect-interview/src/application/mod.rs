//! Application layer: command handlers that orchestrate the domain model
//! and the generation backend, plus read-only query views.

pub mod command_handlers;
pub mod deep_questions;
pub mod imagery;
pub mod narrative;
pub mod query_handlers;
