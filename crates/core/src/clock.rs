//! Injectable time source.
//!
//! Attendance day windows are computed in server-local time and tokens are
//! stamped in UTC. Both go through a [`Clock`] so tests can pin "now".

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current wall-clock time in the server's local timezone.
    fn now_local(&self) -> NaiveDateTime;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a fixed instant.
///
/// The local wall-clock time is the UTC time with no offset applied, which
/// keeps tests independent of the machine's timezone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freezes the clock at a local wall-clock time.
    pub fn at(local: NaiveDateTime) -> Self {
        Self(local.and_utc())
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }

    fn now_local(&self) -> NaiveDateTime {
        self.0.naive_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_reports_the_same_wall_time() {
        let local = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        let clock = FixedClock::at(local);

        assert_eq!(clock.now_local(), local);
        assert_eq!(clock.now_utc().naive_utc(), local);
    }
}
