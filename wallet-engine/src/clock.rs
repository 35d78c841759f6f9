//! Injectable time source
//!
//! The accrual scheduler's once-per-day guard compares calendar dates, so
//! tests need to move time without sleeping. Production wires
//! [`SystemClock`]; tests wire [`ManualClock`] and step it day by day.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::RwLock;

/// Source of "now" for every dated operation in the engine
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date; the unit of accrual idempotency
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = to;
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances_calendar_days() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap());
        let day0 = clock.today();

        clock.advance_days(1);
        assert_eq!(clock.today(), day0.succ_opt().unwrap());
    }
}
