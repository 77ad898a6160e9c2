//! Injectable wall clock.
//!
//! The engine never reads the system time itself: history buckets and
//! completion timestamps come from a [`Clock`], so tests can pin the date.

use std::cell::Cell;

use chrono::{DateTime, Duration, Local, NaiveDate};

pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Calendar date used for history buckets.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The real local-time clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: DateTime<Local>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Local.with_ymd_and_hms(2024, 5, 2, 23, 59, 30).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());

        clock.advance(Duration::seconds(45));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }
}
