use chrono::{DateTime, Utc};

use crate::time::clock::Clock;

/// A [`Clock`] implementation backed by the operating system clock.
///
/// All token timestamps are UTC seconds, so no timezone is involved.
/// Selecting this clock is the job of the composition root (`main.rs`);
/// tests use [`FixedClock`](crate::time::clock::FixedClock) instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
