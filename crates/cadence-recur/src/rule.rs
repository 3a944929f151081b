//! Recurrence rules as tagged variants over their numeric parameters.
//!
//! A rule contributes four hooks to the shared expansion loop: adjusting the
//! base interval to its working granularity, placing the first anchor,
//! advancing an anchor by a number of native units, and closing an anchor
//! into an occurrence end. Minute, hour, and week rules are unit conversions
//! of the second and day rules via the `unit` field; they carry no logic of
//! their own.

use std::cmp::Ordering;

use cadence_core::{CoreError, Interval, PointKind, TimePoint};
use chrono::{Datelike, Days, Duration, Month, Months, NaiveDate, NaiveTime, Weekday};

use crate::clock::ClockTime;
use crate::error::{RecurError, RecurResult};
use crate::zone::Zone;

/// One recurrence rule, interpreted by the shared expansion loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    /// Sub-day steps. `unit` is the number of seconds per native unit:
    /// 1 for seconds, 60 for minutes, 3600 for hours.
    Seconds { unit: u32, offset: i64, span: i64 },
    /// Whole-day steps. `unit` is the number of days per native unit:
    /// 1 for days, 7 for weeks.
    Days { unit: u32, offset: i64, span: i64 },
    /// Every occurrence of one weekday; `offset` counts weeks, `span` days.
    Weekday {
        weekday: Weekday,
        offset: i64,
        span: i64,
    },
    /// Calendar months; day-of-month clamps at shorter months.
    Months { offset: i32, span: i32 },
    /// Every year's occurrence of one month, one month wide from the
    /// anchor's day-of-month.
    MonthOfYear { month: Month },
    /// Calendar years, stepped as twelve months so Feb 29 clamps to Feb 28.
    Years { offset: i32, span: i32 },
    /// One day of every month, wrapping by the anchor month's true length.
    DayOfMonth { day: u32, span: i64 },
    /// A clock time on every day, re-resolved in `zone` per occurrence date.
    TimeOfDay {
        clock: ClockTime,
        span: i64,
        zone: Zone,
    },
    /// A daily window from one clock time to another; the window crosses
    /// midnight when `to` reads earlier than `from`.
    BetweenTimes {
        from: ClockTime,
        to: ClockTime,
        zone: Zone,
    },
}

impl Rule {
    /// Parameter sanity, checked when the rule enters a chain.
    pub(crate) fn validate(&self) -> RecurResult<()> {
        match *self {
            Self::Seconds { unit, span, .. } | Self::Days { unit, span, .. } => {
                if unit == 0 {
                    return Err(RecurError::Configuration("rule unit must be positive"));
                }
                ensure_span(span)
            }
            Self::Weekday { span, .. } | Self::TimeOfDay { span, .. } => ensure_span(span),
            Self::Months { span, .. } | Self::Years { span, .. } => ensure_span(i64::from(span)),
            Self::DayOfMonth { day, span } => {
                if !(1..=31).contains(&day) {
                    return Err(RecurError::Configuration(
                        "day of month must be between 1 and 31",
                    ));
                }
                ensure_span(span)
            }
            Self::MonthOfYear { .. } | Self::BetweenTimes { .. } => Ok(()),
        }
    }

    /// The rule with its offset parameter replaced, in native units.
    pub(crate) fn with_offset(self, offset: i64) -> RecurResult<Self> {
        match self {
            Self::Seconds { unit, span, .. } => Ok(Self::Seconds { unit, offset, span }),
            Self::Days { unit, span, .. } => Ok(Self::Days { unit, offset, span }),
            Self::Weekday { weekday, span, .. } => Ok(Self::Weekday {
                weekday,
                offset,
                span,
            }),
            Self::Months { span, .. } => Ok(Self::Months {
                offset: month_count(offset)?,
                span,
            }),
            Self::Years { span, .. } => Ok(Self::Years {
                offset: month_count(offset)?,
                span,
            }),
            Self::MonthOfYear { .. }
            | Self::DayOfMonth { .. }
            | Self::TimeOfDay { .. }
            | Self::BetweenTimes { .. } => Err(RecurError::Configuration(
                "this rule has no offset parameter",
            )),
        }
    }

    /// The rule with its span parameter replaced, in native units (seconds
    /// for clock rules, days for weekday and day-of-month rules).
    pub(crate) fn with_span(self, span: i64) -> RecurResult<Self> {
        ensure_span(span)?;
        match self {
            Self::Seconds { unit, offset, .. } => Ok(Self::Seconds { unit, offset, span }),
            Self::Days { unit, offset, .. } => Ok(Self::Days { unit, offset, span }),
            Self::Weekday {
                weekday, offset, ..
            } => Ok(Self::Weekday {
                weekday,
                offset,
                span,
            }),
            Self::Months { offset, .. } => Ok(Self::Months {
                offset,
                span: month_count(span)?,
            }),
            Self::Years { offset, .. } => Ok(Self::Years {
                offset,
                span: month_count(span)?,
            }),
            Self::DayOfMonth { day, .. } => Ok(Self::DayOfMonth { day, span }),
            Self::TimeOfDay { clock, zone, .. } => Ok(Self::TimeOfDay { clock, span, zone }),
            Self::MonthOfYear { .. } => Err(RecurError::Configuration(
                "a month-of-year rule always spans one month",
            )),
            Self::BetweenTimes { .. } => Err(RecurError::Configuration(
                "a between-times span is set by its two clock times",
            )),
        }
    }

    /// The kind of point this rule emits over an `input`-kind domain.
    ///
    /// Day rules emit dates whatever they are given. The seconds family
    /// keeps a fixed-offset domain fixed and floats everything else. Zoned
    /// rules emit fixed-offset points unless the zone itself is floating,
    /// in which case a fixed-offset domain has no comparable reading.
    pub(crate) fn output_kind(&self, input: PointKind) -> RecurResult<PointKind> {
        match self {
            Self::Days { .. }
            | Self::Weekday { .. }
            | Self::Months { .. }
            | Self::MonthOfYear { .. }
            | Self::Years { .. }
            | Self::DayOfMonth { .. } => Ok(PointKind::Day),
            Self::Seconds { .. } => {
                if input == PointKind::Fixed {
                    Ok(PointKind::Fixed)
                } else {
                    Ok(PointKind::Floating)
                }
            }
            Self::TimeOfDay { zone, .. } | Self::BetweenTimes { zone, .. } => {
                zoned_output(*zone, input)
            }
        }
    }

    /// Whether this rule works at whole-day granularity.
    pub(crate) const fn day_granular(&self) -> bool {
        matches!(
            self,
            Self::Days { .. }
                | Self::Weekday { .. }
                | Self::Months { .. }
                | Self::MonthOfYear { .. }
                | Self::Years { .. }
                | Self::DayOfMonth { .. }
        )
    }

    /// Whether an occurrence is guaranteed to end on or before the next
    /// anchor at the given step width, whatever the anchor falls on.
    ///
    /// Conservative where the native unit length varies: a month is counted
    /// as 28 days, a zoned day as 23 hours (one-hour DST shifts), and a
    /// zone-resolved window is never guaranteed. A `false` only means the
    /// order of occurrences cannot be relied on, not that they overlap.
    pub(crate) fn spans_within_step(&self, step: u32) -> bool {
        let step = i64::from(step);
        match *self {
            Self::Seconds { span, .. } | Self::Days { span, .. } => span <= step,
            Self::Weekday { span, .. } => span <= step * 7,
            Self::Months { span, .. } | Self::Years { span, .. } => i64::from(span) <= step,
            Self::DayOfMonth { span, .. } => span <= step * 28,
            Self::TimeOfDay { span, .. } => span <= step * 23 * 3600,
            Self::MonthOfYear { .. } => true,
            Self::BetweenTimes { zone, .. } => !matches!(zone, Zone::Iana(_)),
        }
    }

    /// Brings the base interval to this rule's working granularity.
    ///
    /// `None` marks a base that degenerates under adjustment (a sub-hour
    /// floating interval swallowed by a DST gap); the expansion treats it as
    /// an empty domain.
    pub(crate) fn adjust(&self, base: Interval) -> Option<Interval> {
        match self {
            Self::Days { .. }
            | Self::Weekday { .. }
            | Self::Months { .. }
            | Self::MonthOfYear { .. }
            | Self::Years { .. }
            | Self::DayOfMonth { .. } => Some(base.to_day_interval()),
            Self::Seconds { .. } => Some(base.to_time_interval()),
            Self::TimeOfDay { zone, .. } | Self::BetweenTimes { zone, .. } => {
                raise_time(base, *zone)
            }
        }
    }

    /// Brings the start of an open-ended expansion to this rule's working
    /// granularity. Open domains have no upper bound to degenerate, so this
    /// always succeeds.
    pub(crate) fn adjust_open(&self, start: TimePoint) -> TimePoint {
        match self {
            Self::Days { .. }
            | Self::Weekday { .. }
            | Self::Months { .. }
            | Self::MonthOfYear { .. }
            | Self::Years { .. }
            | Self::DayOfMonth { .. } => TimePoint::Day(start.date()),
            Self::Seconds { .. } => lower_to_time(start),
            Self::TimeOfDay { zone, .. } | Self::BetweenTimes { zone, .. } => {
                match lower_to_time(start) {
                    TimePoint::Floating(naive) if !zone.is_floating() => zone.resolve(naive),
                    other => other,
                }
            }
        }
    }

    /// The first anchor: the adjusted range's start carried to this rule's
    /// starting position (offset weeks, next matching weekday, the clock
    /// reading of that date, and so on). `None` stands for arithmetic
    /// overflow and produces an empty expansion.
    pub(crate) fn first_anchor(&self, start: TimePoint) -> Option<TimePoint> {
        match *self {
            Self::Seconds { unit, offset, .. } => {
                add_seconds_point(start, offset.checked_mul(i64::from(unit))?)
            }
            Self::Days { unit, offset, .. } => {
                let date = add_days(start.date(), offset.checked_mul(i64::from(unit))?)?;
                Some(TimePoint::Day(date))
            }
            Self::Weekday {
                weekday, offset, ..
            } => {
                let date = start.date();
                let ahead = (i64::from(weekday.num_days_from_sunday())
                    - i64::from(date.weekday().num_days_from_sunday()))
                .rem_euclid(7);
                let date = add_days(date, ahead.checked_add(offset.checked_mul(7)?)?)?;
                Some(TimePoint::Day(date))
            }
            Self::Months { offset, .. } => Some(TimePoint::Day(add_months(start.date(), offset)?)),
            Self::MonthOfYear { month } => {
                let date = start.date();
                let ahead = (i64::from(month.number_from_month()) - i64::from(date.month()))
                    .rem_euclid(12);
                Some(TimePoint::Day(add_months(date, i32::try_from(ahead).ok()?)?))
            }
            Self::Years { offset, .. } => {
                Some(TimePoint::Day(add_months(start.date(), offset.checked_mul(12)?)?))
            }
            Self::DayOfMonth { day, .. } => {
                let date = start.date();
                let total = days_in_month(date)?;
                let ahead = (i64::from(day) - i64::from(date.day())).rem_euclid(total);
                Some(TimePoint::Day(add_days(date, ahead)?))
            }
            Self::TimeOfDay { clock, zone, .. } => {
                Some(zone.resolve(start.date().and_time(clock.time())))
            }
            Self::BetweenTimes { from, zone, .. } => {
                Some(zone.resolve(start.date().and_time(from.time())))
            }
        }
    }

    /// The anchor `steps` native units after the first anchor. `steps` is
    /// already the step index times the stage's step width. `None` stands
    /// for arithmetic overflow and ends the expansion.
    pub(crate) fn advance(&self, first: TimePoint, steps: u64) -> Option<TimePoint> {
        match *self {
            Self::Seconds { unit, .. } => {
                let seconds = i64::try_from(steps).ok()?.checked_mul(i64::from(unit))?;
                add_seconds_point(first, seconds)
            }
            Self::Days { unit, .. } => advance_days(first, steps.checked_mul(u64::from(unit))?),
            Self::Weekday { .. } => advance_days(first, steps.checked_mul(7)?),
            Self::Months { .. } | Self::DayOfMonth { .. } => advance_months(first, steps, 1),
            Self::MonthOfYear { .. } | Self::Years { .. } => advance_months(first, steps, 12),
            Self::TimeOfDay { clock, zone, .. } => advance_clock(first, steps, clock, zone),
            Self::BetweenTimes { from, zone, .. } => advance_clock(first, steps, from, zone),
        }
    }

    /// Closes an anchor into its occurrence end. `None` skips the occurrence
    /// without ending the expansion.
    pub(crate) fn close(&self, anchor: TimePoint) -> Option<TimePoint> {
        match *self {
            Self::Seconds { unit, span, .. } => {
                add_seconds_point(anchor, span.checked_mul(i64::from(unit))?)
            }
            Self::Days { unit, span, .. } => close_days(anchor, span.checked_mul(i64::from(unit))?),
            Self::Weekday { span, .. } | Self::DayOfMonth { span, .. } => close_days(anchor, span),
            Self::Months { span, .. } => close_months(anchor, span),
            Self::MonthOfYear { .. } => close_months(anchor, 1),
            Self::Years { span, .. } => close_months(anchor, span.checked_mul(12)?),
            Self::TimeOfDay { span, .. } => add_seconds_point(anchor, span),
            Self::BetweenTimes { from, to, zone } => close_between(anchor, from, to, zone),
        }
    }
}

fn lower_to_time(point: TimePoint) -> TimePoint {
    match point {
        TimePoint::Day(date) => TimePoint::Floating(date.and_time(NaiveTime::MIN)),
        TimePoint::Floating(_) | TimePoint::Fixed(_) => point,
    }
}

fn month_count(value: i64) -> RecurResult<i32> {
    i32::try_from(value).map_err(|_| RecurError::Configuration("month count out of range"))
}

fn ensure_span(span: i64) -> RecurResult<()> {
    if span < 0 {
        return Err(RecurError::Configuration("rule span must not be negative"));
    }
    Ok(())
}

fn zoned_output(zone: Zone, input: PointKind) -> RecurResult<PointKind> {
    if zone.is_floating() {
        if input == PointKind::Fixed {
            return Err(RecurError::Core(CoreError::TypeMismatch {
                left: PointKind::Fixed,
                right: PointKind::Floating,
            }));
        }
        Ok(PointKind::Floating)
    } else {
        Ok(PointKind::Fixed)
    }
}

/// Time form of the base, raised into `zone` when the rule is zoned and the
/// base floats. Raising can invert a degenerate interval around a DST gap;
/// the end then clamps to the start.
fn raise_time(base: Interval, zone: Zone) -> Option<Interval> {
    let time = base.to_time_interval();
    match (time.start(), time.end()) {
        (TimePoint::Floating(start), TimePoint::Floating(end)) if !zone.is_floating() => {
            let start = zone.resolve(start);
            let mut end = zone.resolve(end);
            if matches!(start.try_cmp(end), Ok(Ordering::Greater)) {
                end = start;
            }
            Interval::new(start, end, time.end_inclusive()).ok()
        }
        _ => Some(time),
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let magnitude = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

fn add_seconds_point(point: TimePoint, seconds: i64) -> Option<TimePoint> {
    let delta = Duration::try_seconds(seconds)?;
    match point {
        TimePoint::Floating(dt) => dt.checked_add_signed(delta).map(TimePoint::Floating),
        TimePoint::Fixed(dt) => dt.checked_add_signed(delta).map(TimePoint::Fixed),
        TimePoint::Day(_) => None,
    }
}

fn advance_days(anchor: TimePoint, days: u64) -> Option<TimePoint> {
    match anchor {
        TimePoint::Day(date) => date.checked_add_days(Days::new(days)).map(TimePoint::Day),
        TimePoint::Floating(_) | TimePoint::Fixed(_) => None,
    }
}

fn advance_months(anchor: TimePoint, steps: u64, scale: i32) -> Option<TimePoint> {
    let months = i32::try_from(steps).ok()?.checked_mul(scale)?;
    match anchor {
        TimePoint::Day(date) => add_months(date, months).map(TimePoint::Day),
        TimePoint::Floating(_) | TimePoint::Fixed(_) => None,
    }
}

fn advance_clock(anchor: TimePoint, steps: u64, clock: ClockTime, zone: Zone) -> Option<TimePoint> {
    let date = anchor.date().checked_add_days(Days::new(steps))?;
    Some(zone.resolve(date.and_time(clock.time())))
}

fn close_days(anchor: TimePoint, days: i64) -> Option<TimePoint> {
    match anchor {
        TimePoint::Day(date) => add_days(date, days).map(TimePoint::Day),
        TimePoint::Floating(_) | TimePoint::Fixed(_) => None,
    }
}

fn close_months(anchor: TimePoint, months: i32) -> Option<TimePoint> {
    match anchor {
        TimePoint::Day(date) => add_months(date, months).map(TimePoint::Day),
        TimePoint::Floating(_) | TimePoint::Fixed(_) => None,
    }
}

fn close_between(anchor: TimePoint, from: ClockTime, to: ClockTime, zone: Zone) -> Option<TimePoint> {
    let date = anchor.date();
    let end_date = if to.time() < from.time() {
        date.checked_add_days(Days::new(1))?
    } else {
        date
    };
    Some(zone.resolve(end_date.and_time(to.time())))
}

/// Day count of `date`'s month: first of the next month minus the first of
/// this one.
fn days_in_month(date: NaiveDate) -> Option<i64> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((next - first).num_days())
}
