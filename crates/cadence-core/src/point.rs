//! Points on the calendar/time axis.
//!
//! A point is either a calendar date, a floating timestamp (no UTC offset),
//! or an absolute timestamp at a fixed UTC offset. Dates compare with dates
//! and timestamps with timestamps; floating and fixed-offset timestamps are
//! never comparable with each other, mirroring the floating-time caveat of
//! calendaring formats.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Granularity and comparability class of a [`TimePoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    /// Calendar date, no time of day.
    Day,
    /// Timestamp without a UTC offset.
    Floating,
    /// Timestamp at a fixed UTC offset.
    Fixed,
}

impl PointKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Floating => "floating timestamp",
            Self::Fixed => "fixed-offset timestamp",
        }
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single point at date or timestamp granularity.
///
/// Equality is structural; for `Fixed` points it compares the instant, so
/// `14:00:00+02:00` equals `12:00:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePoint {
    /// A calendar date at day granularity.
    Day(NaiveDate),
    /// A timestamp with no UTC offset.
    Floating(NaiveDateTime),
    /// An absolute timestamp with a fixed UTC offset.
    Fixed(DateTime<FixedOffset>),
}

impl TimePoint {
    #[must_use]
    pub const fn kind(self) -> PointKind {
        match self {
            Self::Day(_) => PointKind::Day,
            Self::Floating(_) => PointKind::Floating,
            Self::Fixed(_) => PointKind::Fixed,
        }
    }

    /// The calendar date this point falls on (local reading for `Fixed`).
    #[must_use]
    pub fn date(self) -> NaiveDate {
        match self {
            Self::Day(d) => d,
            Self::Floating(dt) => dt.date(),
            Self::Fixed(dt) => dt.date_naive(),
        }
    }

    /// ## Summary
    /// Compares two points of the same kind.
    ///
    /// ## Errors
    /// `TypeMismatch` when the operands are of different kinds.
    pub fn try_cmp(self, other: Self) -> CoreResult<Ordering> {
        self.partial_cmp(&other)
            .ok_or_else(|| CoreError::TypeMismatch {
                left: self.kind(),
                right: other.kind(),
            })
    }
}

impl PartialOrd for TimePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Day(a), Self::Day(b)) => Some(a.cmp(b)),
            (Self::Floating(a), Self::Floating(b)) => Some(a.cmp(b)),
            (Self::Fixed(a), Self::Fixed(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(d) => write!(f, "{d}"),
            Self::Floating(dt) => write!(f, "{dt}"),
            Self::Fixed(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<NaiveDate> for TimePoint {
    fn from(date: NaiveDate) -> Self {
        Self::Day(date)
    }
}

impl From<NaiveDateTime> for TimePoint {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::Floating(datetime)
    }
}

impl From<DateTime<FixedOffset>> for TimePoint {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Self::Fixed(datetime)
    }
}

/// Reinterprets a local wall-clock reading at a fixed UTC offset.
#[must_use]
pub fn fixed_datetime(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = local
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .unwrap_or(local);
    DateTime::from_naive_utc_and_offset(utc, offset)
}
