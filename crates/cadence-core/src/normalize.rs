//! Canonical exclusive-end forms of an interval.
//!
//! A single exclusive-end convention lets every downstream boundary check be a
//! plain comparison, whatever mix of date-only and timestamped, inclusive and
//! exclusive intervals the caller supplies.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::interval::Interval;
use crate::point::{PointKind, TimePoint};

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

impl Interval {
    /// ## Summary
    /// The day-granularity form of this interval, exclusive-end.
    ///
    /// An exclusive-end date interval comes back unchanged. An inclusive date
    /// end advances by one day and becomes exclusive. Timestamped endpoints
    /// truncate to their calendar dates, the end advancing one day only when
    /// the interval was end-inclusive. Idempotent.
    #[must_use]
    pub fn to_day_interval(self) -> Self {
        if self.kind() == PointKind::Day && !self.end_inclusive() {
            return self;
        }
        let start = self.start().date();
        let end = if self.end_inclusive() {
            next_day(self.end().date())
        } else {
            self.end().date()
        };
        Self::from_parts(TimePoint::Day(start), TimePoint::Day(end), false)
    }

    /// ## Summary
    /// The time-granularity form of this interval.
    ///
    /// Endpoints that already carry time-of-day keep their values and the
    /// given end-inclusivity. A date interval widens via
    /// [`to_day_interval`](Self::to_day_interval) and reads both endpoints as
    /// floating midnights, exclusive-end.
    #[must_use]
    pub fn to_time_interval(self) -> Self {
        match (self.start(), self.end()) {
            (TimePoint::Day(_), TimePoint::Day(_)) => {
                let days = self.to_day_interval();
                Self::from_parts(
                    TimePoint::Floating(days.start().date().and_time(NaiveTime::MIN)),
                    TimePoint::Floating(days.end().date().and_time(NaiveTime::MIN)),
                    false,
                )
            }
            _ => self,
        }
    }
}
