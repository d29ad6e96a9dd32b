//! Recollect Core — shared abstractions.
//!
//! This crate defines the traits and types every other crate depends on:
//! time, commands, errors, interaction-log metadata and the ports through
//! which the engine talks to the generation backend and the viewer context. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod generation;
pub mod image;
pub mod viewer;
