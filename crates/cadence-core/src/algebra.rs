//! Relational algebra over intervals.
//!
//! Every operation normalizes both operands before comparing: day-kind when
//! both are date intervals, time-kind when either endpoint carries
//! time-of-day. A date operand meeting a fixed-offset partner is raised to
//! midnights at the partner's corresponding endpoint offsets, so a DST change
//! inside the partner keeps both boundaries exact. Floating and fixed-offset
//! operands are incomparable.

use std::cmp::Ordering;

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{CoreError, CoreResult};
use crate::interval::Interval;
use crate::point::{PointKind, TimePoint, fixed_datetime};

/// Smallest representable step at a granularity. An inclusive end touches
/// the point one tick after it; timestamps tick in whole seconds.
trait Tick: Copy + Ord {
    fn tick(self) -> Self;
}

impl Tick for NaiveDate {
    fn tick(self) -> Self {
        self.checked_add_days(Days::new(1)).unwrap_or(self)
    }
}

impl Tick for NaiveDateTime {
    fn tick(self) -> Self {
        self.checked_add_signed(Duration::seconds(1)).unwrap_or(self)
    }
}

impl Tick for DateTime<FixedOffset> {
    fn tick(self) -> Self {
        self.checked_add_signed(Duration::seconds(1)).unwrap_or(self)
    }
}

/// One operand reduced to ordered bounds over a single primitive type.
#[derive(Clone, Copy)]
struct Span<T> {
    start: T,
    end: T,
    end_inclusive: bool,
}

impl<T: Tick> Span<T> {
    fn intersect(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        // At a value tie the exclusive bound is the smaller end.
        let (end, end_inclusive) = match self.end.cmp(&other.end) {
            Ordering::Less => (self.end, self.end_inclusive),
            Ordering::Greater => (other.end, other.end_inclusive),
            Ordering::Equal => (self.end, self.end_inclusive && other.end_inclusive),
        };
        if end < start {
            return None;
        }
        Some(Self {
            start,
            end,
            end_inclusive,
        })
    }

    fn precedes(self, other: Self) -> bool {
        if self.end_inclusive {
            self.end < other.start
        } else {
            self.end <= other.start
        }
    }

    /// Whether this span's end bound meets the other's start exactly.
    fn touches(self, other: Self) -> bool {
        if self.end_inclusive {
            self.end.tick() == other.start
        } else {
            self.end == other.start
        }
    }

    fn adjacent(self, other: Self) -> bool {
        (self.precedes(other) && self.touches(other))
            || (other.precedes(self) && other.touches(self))
    }

    /// End-bound ≤, resolved per operand flag. Of the four inclusivity
    /// combinations only inclusive-under-exclusive forbids a value tie;
    /// inclusive/inclusive, exclusive/inclusive, and exclusive/exclusive
    /// all admit one.
    fn end_le(self, other: Self) -> bool {
        if self.end_inclusive && !other.end_inclusive {
            self.end < other.end
        } else {
            self.end <= other.end
        }
    }

    fn within(self, other: Self) -> bool {
        self.start >= other.start && self.end_le(other)
    }

    /// Containment with roles reversed. The end-bound tie is resolved for
    /// this operand order, not by delegating to `within` with swapped
    /// arguments.
    fn subsumes(self, other: Self) -> bool {
        let end_fits = if other.end_inclusive && !self.end_inclusive {
            other.end < self.end
        } else {
            other.end <= self.end
        };
        other.start >= self.start && end_fits
    }
}

/// Both operands brought to one comparison domain.
enum Aligned {
    Days(Span<NaiveDate>, Span<NaiveDate>),
    Floating(Span<NaiveDateTime>, Span<NaiveDateTime>),
    Fixed(Span<DateTime<FixedOffset>>, Span<DateTime<FixedOffset>>),
}

fn mismatch(a: Interval, b: Interval) -> CoreError {
    CoreError::TypeMismatch {
        left: a.kind(),
        right: b.kind(),
    }
}

fn day_span(iv: Interval) -> Span<NaiveDate> {
    let days = iv.to_day_interval();
    Span {
        start: days.start().date(),
        end: days.end().date(),
        end_inclusive: false,
    }
}

fn floating_span(iv: Interval) -> Option<Span<NaiveDateTime>> {
    match (iv.start(), iv.end()) {
        (TimePoint::Floating(start), TimePoint::Floating(end)) => Some(Span {
            start,
            end,
            end_inclusive: iv.end_inclusive(),
        }),
        _ => None,
    }
}

fn fixed_span(iv: Interval) -> Option<Span<DateTime<FixedOffset>>> {
    match (iv.start(), iv.end()) {
        (TimePoint::Fixed(start), TimePoint::Fixed(end)) => Some(Span {
            start,
            end,
            end_inclusive: iv.end_inclusive(),
        }),
        _ => None,
    }
}

/// Date operand raised to floating midnights.
fn day_as_floating(iv: Interval) -> Span<NaiveDateTime> {
    let days = iv.to_day_interval();
    Span {
        start: days.start().date().and_time(NaiveTime::MIN),
        end: days.end().date().and_time(NaiveTime::MIN),
        end_inclusive: false,
    }
}

/// Date operand raised against a fixed-offset partner: the raised start
/// borrows the partner's start offset and the raised end its end offset.
fn day_against_fixed(
    iv: Interval,
    partner: Span<DateTime<FixedOffset>>,
) -> Span<DateTime<FixedOffset>> {
    let days = iv.to_day_interval();
    Span {
        start: fixed_datetime(
            days.start().date().and_time(NaiveTime::MIN),
            *partner.start.offset(),
        ),
        end: fixed_datetime(
            days.end().date().and_time(NaiveTime::MIN),
            *partner.end.offset(),
        ),
        end_inclusive: false,
    }
}

fn normalize_pair(a: Interval, b: Interval) -> CoreResult<Aligned> {
    match (a.kind(), b.kind()) {
        (PointKind::Day, PointKind::Day) => Ok(Aligned::Days(day_span(a), day_span(b))),
        (PointKind::Floating, PointKind::Floating) => {
            let lhs = floating_span(a).ok_or_else(|| mismatch(a, b))?;
            let rhs = floating_span(b).ok_or_else(|| mismatch(a, b))?;
            Ok(Aligned::Floating(lhs, rhs))
        }
        (PointKind::Fixed, PointKind::Fixed) => {
            let lhs = fixed_span(a).ok_or_else(|| mismatch(a, b))?;
            let rhs = fixed_span(b).ok_or_else(|| mismatch(a, b))?;
            Ok(Aligned::Fixed(lhs, rhs))
        }
        (PointKind::Day, PointKind::Floating) => {
            let rhs = floating_span(b).ok_or_else(|| mismatch(a, b))?;
            Ok(Aligned::Floating(day_as_floating(a), rhs))
        }
        (PointKind::Floating, PointKind::Day) => {
            let lhs = floating_span(a).ok_or_else(|| mismatch(a, b))?;
            Ok(Aligned::Floating(lhs, day_as_floating(b)))
        }
        (PointKind::Day, PointKind::Fixed) => {
            let rhs = fixed_span(b).ok_or_else(|| mismatch(a, b))?;
            tracing::trace!(dates = %a, partner = %b, "Raising date operand to the partner's offsets");
            Ok(Aligned::Fixed(day_against_fixed(a, rhs), rhs))
        }
        (PointKind::Fixed, PointKind::Day) => {
            let lhs = fixed_span(a).ok_or_else(|| mismatch(a, b))?;
            tracing::trace!(dates = %b, partner = %a, "Raising date operand to the partner's offsets");
            Ok(Aligned::Fixed(lhs, day_against_fixed(b, lhs)))
        }
        (PointKind::Floating, PointKind::Fixed) | (PointKind::Fixed, PointKind::Floating) => {
            Err(mismatch(a, b))
        }
    }
}

fn day_interval(span: Span<NaiveDate>) -> Interval {
    Interval::from_parts(
        TimePoint::Day(span.start),
        TimePoint::Day(span.end),
        span.end_inclusive,
    )
}

fn floating_interval(span: Span<NaiveDateTime>) -> Interval {
    Interval::from_parts(
        TimePoint::Floating(span.start),
        TimePoint::Floating(span.end),
        span.end_inclusive,
    )
}

fn fixed_interval(span: Span<DateTime<FixedOffset>>) -> Interval {
    Interval::from_parts(
        TimePoint::Fixed(span.start),
        TimePoint::Fixed(span.end),
        span.end_inclusive,
    )
}

impl Interval {
    /// ## Summary
    /// The overlap of two intervals: the later start to the earlier end bound.
    ///
    /// `None` means no overlap. Exactly-adjacent operands produce a zero-width
    /// interval rather than `None`; callers can tell the two apart with
    /// [`is_empty`](Self::is_empty). The result end is inclusive only when
    /// every operand tied at the winning end bound is inclusive.
    ///
    /// ## Errors
    /// `TypeMismatch` when one operand holds floating and the other
    /// fixed-offset timestamps.
    pub fn intersection(&self, other: Self) -> CoreResult<Option<Self>> {
        Ok(match normalize_pair(*self, other)? {
            Aligned::Days(a, b) => a.intersect(b).map(day_interval),
            Aligned::Floating(a, b) => a.intersect(b).map(floating_interval),
            Aligned::Fixed(a, b) => a.intersect(b).map(fixed_interval),
        })
    }

    /// ## Summary
    /// Whether this interval ends on or before the other starts.
    ///
    /// An exclusive end may equal the other's start; an inclusive end must
    /// fall strictly before it.
    ///
    /// ## Errors
    /// `TypeMismatch` when the operands are incomparable.
    pub fn precedes(&self, other: Self) -> CoreResult<bool> {
        Ok(match normalize_pair(*self, other)? {
            Aligned::Days(a, b) => a.precedes(b),
            Aligned::Floating(a, b) => a.precedes(b),
            Aligned::Fixed(a, b) => a.precedes(b),
        })
    }

    /// `a.succeeds(b)` holds exactly when `b.precedes(a)` does.
    ///
    /// ## Errors
    /// `TypeMismatch` when the operands are incomparable.
    pub fn succeeds(&self, other: Self) -> CoreResult<bool> {
        other.precedes(*self)
    }

    /// ## Summary
    /// Whether the two intervals touch without overlapping.
    ///
    /// One operand must precede the other with its end bound meeting the
    /// other's start exactly; an inclusive timestamp end touches the second
    /// after it.
    ///
    /// ## Errors
    /// `TypeMismatch` when the operands are incomparable.
    pub fn adjacent_to(&self, other: Self) -> CoreResult<bool> {
        Ok(match normalize_pair(*self, other)? {
            Aligned::Days(a, b) => a.adjacent(b),
            Aligned::Floating(a, b) => a.adjacent(b),
            Aligned::Fixed(a, b) => a.adjacent(b),
        })
    }

    /// ## Summary
    /// Whether this interval lies entirely inside the other.
    ///
    /// ## Errors
    /// `TypeMismatch` when the operands are incomparable.
    pub fn within(&self, other: Self) -> CoreResult<bool> {
        Ok(match normalize_pair(*self, other)? {
            Aligned::Days(a, b) => a.within(b),
            Aligned::Floating(a, b) => a.within(b),
            Aligned::Fixed(a, b) => a.within(b),
        })
    }

    /// ## Summary
    /// Whether this interval entirely contains the other.
    ///
    /// ## Errors
    /// `TypeMismatch` when the operands are incomparable.
    pub fn subsumes(&self, other: Self) -> CoreResult<bool> {
        Ok(match normalize_pair(*self, other)? {
            Aligned::Days(a, b) => a.subsumes(b),
            Aligned::Floating(a, b) => a.subsumes(b),
            Aligned::Fixed(a, b) => a.subsumes(b),
        })
    }
}
