//! Time source for `created_at` / `updated_at`.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Deterministic clocks for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// Returns `start`, then advances by `step` on every call.
    pub struct StepClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl StepClock {
        pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self { next: Mutex::new(start), step }
        }
    }

    impl Default for StepClock {
        fn default() -> Self {
            // 2024-01-01T00:00:00Z
            Self::new(Utc.timestamp_opt(1_704_067_200, 0).unwrap(), Duration::seconds(1))
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock().unwrap();
            let now = *next;
            *next = now + self.step;
            now
        }
    }
}
