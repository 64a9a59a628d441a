use chrono::{DateTime, Utc};

/// A port that provides the **current instant** for the application.
///
/// # Purpose
/// Token issuing and verification compare claim timestamps against "now".
/// Routing that through this trait keeps the comparison deterministic:
///
/// - Token logic does **not** read the system clock directly
/// - Implementations can be swapped (system clock, fixed clock)
/// - Expiry and clock-skew tests need no sleeping
///
/// # Typical Implementations
/// - [`SystemClock`](crate::time::system_clock::SystemClock): wall clock (UTC)
/// - [`FixedClock`]: a constant instant, for tests
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// A [`Clock`] frozen at a single instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Builds a clock from a UNIX timestamp in seconds.
    ///
    /// Out-of-range timestamps fall back to the UNIX epoch.
    pub fn at_timestamp(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_given_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 10, 2, 8, 30, 0).unwrap();
        let clock = FixedClock::new(instant);

        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn clock_trait_object_works() {
        let clock: Box<dyn Clock> = Box::new(FixedClock::at_timestamp(1_700_000_000));

        assert_eq!(clock.now().timestamp(), 1_700_000_000);
    }
}
