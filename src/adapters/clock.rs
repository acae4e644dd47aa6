use crate::domain::ports::DateProvider;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl DateProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and for replaying a given day.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Noon UTC on the given date. Panics on an impossible date.
    pub fn on_date(year: i32, month: u32, day: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("invalid date {}-{}-{}", year, month, day));
        Self::new(now)
    }

    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.0.lock() = now;
    }

    pub fn set_date(&self, date: NaiveDate) {
        let time = self.0.lock().time();
        self.set_now(date.and_time(time).and_utc());
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock();
        *now += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl DateProvider for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_moves_only_when_told() {
        let clock = FixedClock::on_date(2025, 2, 4);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());

        clock.advance(Duration::hours(11));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());

        clock.advance(Duration::hours(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 2, 5).unwrap());

        clock.set_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }
}
