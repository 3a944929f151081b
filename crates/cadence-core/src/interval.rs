//! Calendar/time intervals with explicit end-inclusivity.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::point::{PointKind, TimePoint};

/// A span between two points of the same granularity.
///
/// The start is always covered; whether the end is covered is carried
/// explicitly in `end_inclusive`. Invariants: both endpoints share one
/// [`PointKind`] and `start ≤ end`. Immutable value type with structural
/// equality; every operation yields a new interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    start: TimePoint,
    end: TimePoint,
    end_inclusive: bool,
}

impl Interval {
    /// ## Summary
    /// Builds an interval from two points of the same kind.
    ///
    /// ## Errors
    /// `TypeMismatch` when the endpoints differ in kind; `InvariantViolation`
    /// when `start > end`.
    pub fn new(start: TimePoint, end: TimePoint, end_inclusive: bool) -> CoreResult<Self> {
        if start.try_cmp(end)? == Ordering::Greater {
            return Err(CoreError::InvariantViolation(
                "interval start must not exceed its end",
            ));
        }
        Ok(Self {
            start,
            end,
            end_inclusive,
        })
    }

    /// Exclusive-end date interval.
    ///
    /// ## Errors
    /// `InvariantViolation` when `start > end`.
    pub fn dates(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        Self::new(start.into(), end.into(), false)
    }

    /// Inclusive-end date interval (covers the whole of `end`).
    ///
    /// ## Errors
    /// `InvariantViolation` when `start > end`.
    pub fn dates_inclusive(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        Self::new(start.into(), end.into(), true)
    }

    /// Exclusive-end floating time interval.
    ///
    /// ## Errors
    /// `InvariantViolation` when `start > end`.
    pub fn floating(start: NaiveDateTime, end: NaiveDateTime) -> CoreResult<Self> {
        Self::new(start.into(), end.into(), false)
    }

    /// Inclusive-end floating time interval.
    ///
    /// ## Errors
    /// `InvariantViolation` when `start > end`.
    pub fn floating_inclusive(start: NaiveDateTime, end: NaiveDateTime) -> CoreResult<Self> {
        Self::new(start.into(), end.into(), true)
    }

    /// Exclusive-end fixed-offset time interval.
    ///
    /// ## Errors
    /// `InvariantViolation` when `start > end`.
    pub fn fixed(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> CoreResult<Self> {
        Self::new(start.into(), end.into(), false)
    }

    /// Inclusive-end fixed-offset time interval.
    ///
    /// ## Errors
    /// `InvariantViolation` when `start > end`.
    pub fn fixed_inclusive(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CoreResult<Self> {
        Self::new(start.into(), end.into(), true)
    }

    /// Endpoint order and kind agreement are upheld by the caller.
    pub(crate) const fn from_parts(start: TimePoint, end: TimePoint, end_inclusive: bool) -> Self {
        Self {
            start,
            end,
            end_inclusive,
        }
    }

    #[must_use]
    pub const fn start(&self) -> TimePoint {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> TimePoint {
        self.end
    }

    #[must_use]
    pub const fn end_inclusive(&self) -> bool {
        self.end_inclusive
    }

    /// The shared kind of both endpoints.
    #[must_use]
    pub const fn kind(&self) -> PointKind {
        self.start.kind()
    }

    /// Whether the interval covers no point at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end && !self.end_inclusive
    }

    /// ## Summary
    /// Whether `point` lies inside this interval, honoring `end_inclusive`.
    ///
    /// The point must be of the same kind as the endpoints; date intervals are
    /// not raised to time intervals here (see the algebra operations for
    /// cross-granularity comparisons).
    ///
    /// ## Errors
    /// `TypeMismatch` when the point kind differs from the endpoint kind.
    pub fn contains(&self, point: TimePoint) -> CoreResult<bool> {
        if point.try_cmp(self.start)? == Ordering::Less {
            return Ok(false);
        }
        Ok(match point.try_cmp(self.end)? {
            Ordering::Less => true,
            Ordering::Equal => self.end_inclusive,
            Ordering::Greater => false,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = if self.end_inclusive { ']' } else { ')' };
        write!(f, "[{}, {}{close}", self.start, self.end)
    }
}
