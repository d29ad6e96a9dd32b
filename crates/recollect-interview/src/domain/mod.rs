//! Domain model for the interview context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod history;
pub mod keywords;
pub mod panorama;
pub mod profile;
pub mod prompts;
pub mod questions;
pub mod scene;
