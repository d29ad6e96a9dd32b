//! Shared test doubles and utilities for the Recollect engine.

mod clock;
mod generation;
mod viewer;

pub use clock::{FixedClock, fixed_now};
pub use generation::{StubImageGenerator, StubTextGenerator, narrative_json};
pub use viewer::RecordingViewer;
