//! Clock abstraction for determinism.

use chrono::{DateTime, Local, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch, used as the basis for scene ids.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Human-readable local timestamp, 24-hour clock.
    ///
    /// Informational only; nothing orders by this label.
    fn local_label(&self) -> String {
        self.now()
            .with_timezone(&Local)
            .format("%Y. %-m. %-d. %H:%M:%S")
            .to_string()
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
