//! Typed chaining of recurrence rules onto interval-like values.
//!
//! Every chainable value implements [`Recurring`]: bounded intervals, open
//! domains, plain points (read as open domains), and stages themselves, so
//! `interval.each_months(1)?.weekday(Weekday::Thu, 2)?.at_time("2:00pm", 3600)?`
//! reads left to right with no runtime extension tricks.

use cadence_core::{Interval, TimePoint};
use chrono::{Datelike, FixedOffset, Month, Weekday};
use chrono_tz::Tz;

use crate::clock::ClockTime;
use crate::error::{RecurError, RecurResult};
use crate::rule::Rule;
use crate::stage::{Domain, Parent, Stage};
use crate::symbol::WeekdaySet;
use crate::zone::Zone;

/// Grows a recurrence chain from any interval-like value.
///
/// The `each_*` factories yield every occurrence; the singular forms
/// (`second`, `day`, `weekday`, ...) take one occurrence at an offset. Unit
/// multipliers (`n`) widen the stride: `each_days(3)` is every third day.
pub trait Recurring: Sized {
    /// Wraps the value as the parent of the next stage.
    fn into_parent(self) -> Parent;

    /// Every `n`-th second.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_seconds(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), seconds_rule(1), n)
    }

    /// Every `n`-th minute.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_minutes(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), seconds_rule(60), n)
    }

    /// Every `n`-th hour.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_hours(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), seconds_rule(3600), n)
    }

    /// Every `n`-th day.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_days(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), days_rule(1), n)
    }

    /// Every `n`-th week, anchored on the domain's starting day.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_weeks(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), days_rule(7), n)
    }

    /// Every `n`-th occurrence of `weekday`, starting at the first one on or
    /// after the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_weekday(self, weekday: Weekday, n: u32) -> RecurResult<Stage> {
        let rule = Rule::Weekday {
            weekday,
            offset: 0,
            span: 1,
        };
        chain_stepped(self.into_parent(), rule, n)
    }

    /// Every `n`-th calendar month; day-of-month clamps at shorter months.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_months(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), Rule::Months { offset: 0, span: 1 }, n)
    }

    /// `month` in every `n`-th year, one month wide, anchored on the
    /// domain start's day-of-month.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_month_of_year(self, month: Month, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), Rule::MonthOfYear { month }, n)
    }

    /// Every `n`-th year; Feb 29 starts clamp to Feb 28 off leap years.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `n` is zero.
    fn each_years(self, n: u32) -> RecurResult<Stage> {
        chain_stepped(self.into_parent(), Rule::Years { offset: 0, span: 1 }, n)
    }

    /// The `day`-th of every month, wrapping by each month's true length.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `day` is outside `1..=31`.
    fn each_day_of_month(self, day: u32) -> RecurResult<Stage> {
        Stage::chain(self.into_parent(), Rule::DayOfMonth { day, span: 1 })
    }

    /// Every day whose weekday lies in `days`.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `days` is empty.
    fn each_days_of_week(self, days: WeekdaySet) -> RecurResult<Stage> {
        if days.is_empty() {
            return Err(RecurError::Configuration(
                "the weekday set must not be empty",
            ));
        }
        let stage = Stage::chain(self.into_parent(), days_rule(1))?;
        Ok(stage.except(move |anchor| !days.contains(anchor.date().weekday())))
    }

    /// Monday through Friday.
    ///
    /// ## Errors
    /// None from this fixed, non-empty set.
    fn each_weekdays(self) -> RecurResult<Stage> {
        self.each_days_of_week(WeekdaySet::WEEKDAYS)
    }

    /// Saturday and Sunday.
    ///
    /// ## Errors
    /// None from this fixed, non-empty set.
    fn each_weekends(self) -> RecurResult<Stage> {
        self.each_days_of_week(WeekdaySet::WEEKENDS)
    }

    /// `clock` on every day, lasting `span` seconds. An explicit offset in
    /// the clock string ("2:00pm -0500") pins every occurrence to it;
    /// otherwise occurrences stay floating.
    ///
    /// ## Errors
    /// [`RecurError::ClockParse`] when the clock string does not parse.
    fn at_time(self, clock: &str, span: i64) -> RecurResult<Stage> {
        let clock = ClockTime::parse(clock)?;
        let zone = fixed_zone(clock)?.unwrap_or(Zone::Floating);
        let rule = Rule::TimeOfDay { clock, span, zone };
        Stage::chain(self.into_parent(), rule)
    }

    /// `clock` on every day, resolved in `tz` so the UTC offset follows
    /// that date's DST rules.
    ///
    /// ## Errors
    /// [`RecurError::ClockParse`] when the clock string does not parse;
    /// [`RecurError::Configuration`] when it also carries its own offset,
    /// which would contradict `tz`.
    fn at_time_in(self, clock: &str, span: i64, tz: Tz) -> RecurResult<Stage> {
        let clock = ClockTime::parse(clock)?;
        if clock.offset_seconds().is_some() {
            return Err(RecurError::Configuration(
                "a clock string with its own offset cannot also take a zone",
            ));
        }
        let rule = Rule::TimeOfDay {
            clock,
            span,
            zone: Zone::Iana(tz),
        };
        Stage::chain(self.into_parent(), rule)
    }

    /// The daily window from `from` to `to`; the window runs into the next
    /// day when `to` reads earlier than `from`.
    ///
    /// ## Errors
    /// [`RecurError::ClockParse`] when either clock string does not parse.
    fn between_times(self, from: &str, to: &str) -> RecurResult<Stage> {
        let (from, to, explicit) = parse_window(from, to)?;
        let zone = explicit.unwrap_or(Zone::Floating);
        let rule = Rule::BetweenTimes { from, to, zone };
        Stage::chain(self.into_parent(), rule)
    }

    /// The daily window from `from` to `to`, resolved in `tz`.
    ///
    /// ## Errors
    /// [`RecurError::ClockParse`] when either clock string does not parse;
    /// [`RecurError::Configuration`] when either carries its own offset,
    /// which would contradict `tz`.
    fn between_times_in(self, from: &str, to: &str, tz: Tz) -> RecurResult<Stage> {
        let (from, to, explicit) = parse_window(from, to)?;
        if explicit.is_some() {
            return Err(RecurError::Configuration(
                "a clock string with its own offset cannot also take a zone",
            ));
        }
        let rule = Rule::BetweenTimes {
            from,
            to,
            zone: Zone::Iana(tz),
        };
        Stage::chain(self.into_parent(), rule)
    }

    /// The single second `offset` seconds past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn second(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_seconds(1)?, offset)
    }

    /// The single minute `offset` minutes past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn minute(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_minutes(1)?, offset)
    }

    /// The single hour `offset` hours past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn hour(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_hours(1)?, offset)
    }

    /// The single day `offset` days past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn day(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_days(1)?, offset)
    }

    /// The single week starting `offset` weeks past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn week(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_weeks(1)?, offset)
    }

    /// The single `weekday` `nth` weeks after the first one in the domain;
    /// `weekday(Thu, 0)` is the first Thursday.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn weekday(self, weekday: Weekday, nth: i64) -> RecurResult<Stage> {
        single(self.each_weekday(weekday, 1)?, nth)
    }

    /// The single month `offset` months past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn month(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_months(1)?, offset)
    }

    /// The single year `offset` years past the domain's start.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the offset does not fit the rule.
    fn year(self, offset: i64) -> RecurResult<Stage> {
        single(self.each_years(1)?, offset)
    }
}

impl Recurring for Interval {
    fn into_parent(self) -> Parent {
        Parent::Root(Domain::Bounded(self))
    }
}

impl Recurring for Domain {
    fn into_parent(self) -> Parent {
        Parent::Root(self)
    }
}

/// A bare point chains as an open domain running forward from it.
impl Recurring for TimePoint {
    fn into_parent(self) -> Parent {
        Parent::Root(Domain::Onward(self))
    }
}

impl Recurring for Stage {
    fn into_parent(self) -> Parent {
        Parent::Stage(Box::new(self))
    }
}

const fn seconds_rule(unit: u32) -> Rule {
    Rule::Seconds {
        unit,
        offset: 0,
        span: 1,
    }
}

const fn days_rule(unit: u32) -> Rule {
    Rule::Days {
        unit,
        offset: 0,
        span: 1,
    }
}

fn chain_stepped(parent: Parent, rule: Rule, n: u32) -> RecurResult<Stage> {
    Stage::chain(parent, rule)?.step_by(n)
}

fn single(stage: Stage, offset: i64) -> RecurResult<Stage> {
    stage.offset_by(offset)?.limit_to(1)
}

/// The zone pinned by an explicit offset in the clock string, if any.
fn fixed_zone(clock: ClockTime) -> RecurResult<Option<Zone>> {
    clock
        .offset_seconds()
        .map(|seconds| {
            FixedOffset::east_opt(seconds)
                .map(Zone::Fixed)
                .ok_or_else(|| RecurError::Configuration("clock offset out of range"))
        })
        .transpose()
}

fn parse_window(from: &str, to: &str) -> RecurResult<(ClockTime, ClockTime, Option<Zone>)> {
    let from = ClockTime::parse(from)?;
    let to = ClockTime::parse(to)?;
    let explicit = match (fixed_zone(from)?, fixed_zone(to)?) {
        (Some(opening), Some(closing)) => {
            if opening != closing {
                return Err(RecurError::Configuration(
                    "the window's clock strings carry conflicting offsets",
                ));
            }
            Some(opening)
        }
        (Some(zone), None) | (None, Some(zone)) => Some(zone),
        (None, None) => None,
    };
    Ok((from, to, explicit))
}
