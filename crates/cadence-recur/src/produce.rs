//! The lazy occurrence sequence behind [`Stage::produce`].
//!
//! Generation is pull-based and synchronous. A stage over another stage
//! pulls one parent interval at a time and runs a full expansion inside it,
//! with fresh counters; a stage over the root runs a single expansion. All
//! cursor state lives here, so one chain can back any number of passes.

use std::cmp::Ordering;
use std::fmt;

use cadence_core::{Interval, TimePoint};

use crate::stage::{Domain, Parent, Stage, StageConfig};

/// One pass over a chain, yielding occurrence intervals in order.
pub struct Occurrences<'a> {
    stage: &'a Stage,
    parents: Option<Box<Occurrences<'a>>>,
    expansion: Option<Expansion<'a>>,
}

impl<'a> Occurrences<'a> {
    pub(crate) fn over(stage: &'a Stage) -> Self {
        match &stage.parent {
            Parent::Root(domain) => Self {
                stage,
                parents: None,
                expansion: Expansion::begin(&stage.config, *domain),
            },
            Parent::Stage(below) => Self {
                stage,
                parents: Some(Box::new(Self::over(below))),
                expansion: None,
            },
        }
    }
}

impl fmt::Debug for Occurrences<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Occurrences")
            .field("stage", self.stage)
            .finish_non_exhaustive()
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            if let Some(expansion) = &mut self.expansion {
                if let Some(occurrence) = expansion.next() {
                    return Some(occurrence);
                }
                self.expansion = None;
            }
            let base = self.parents.as_mut()?.next()?;
            self.expansion = Expansion::begin(&self.stage.config, Domain::Bounded(base));
        }
    }
}

/// The stop condition of one expansion: a bounded adjusted range, or only a
/// lower edge when the domain is open-ended.
enum Bounds {
    Within(Interval),
    From(TimePoint),
}

impl Bounds {
    fn admits(&self, anchor: TimePoint) -> bool {
        match *self {
            Self::Within(interval) => interval.contains(anchor).unwrap_or(false),
            // Open domains have no upper bound, but an anchor placed before
            // the start (a negative offset) ends the expansion the same way
            // it would against a bounded range.
            Self::From(start) => matches!(
                anchor.try_cmp(start),
                Ok(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

/// One expansion over one base, per the stage's configuration.
struct Expansion<'a> {
    config: &'a StageConfig,
    bounds: Bounds,
    first: Option<TimePoint>,
    index: u64,
    yielded: usize,
    done: bool,
}

impl<'a> Expansion<'a> {
    /// `None` marks a base that degenerates under range adjustment; the
    /// caller skips it and moves to the next parent interval.
    fn begin(config: &'a StageConfig, domain: Domain) -> Option<Self> {
        let (bounds, first) = match domain {
            Domain::Bounded(base) => {
                let adjusted = config.rule.adjust(base)?;
                tracing::debug!(range = %adjusted, "Beginning expansion");
                let first = config.rule.first_anchor(adjusted.start());
                (Bounds::Within(adjusted), first)
            }
            Domain::Onward(point) => {
                let start = config.rule.adjust_open(point);
                tracing::debug!(from = %start, "Beginning open-ended expansion");
                (Bounds::From(start), config.rule.first_anchor(start))
            }
        };
        Some(Self {
            config,
            bounds,
            first,
            index: 0,
            yielded: 0,
            done: false,
        })
    }
}

impl Iterator for Expansion<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            if self.done {
                return None;
            }
            if let Some(limit) = self.config.limit {
                if self.yielded >= limit {
                    self.done = true;
                    return None;
                }
            }
            let first = self.first?;
            let Some(steps) = self.index.checked_mul(u64::from(self.config.step)) else {
                self.done = true;
                return None;
            };
            let Some(anchor) = self.config.rule.advance(first, steps) else {
                self.done = true;
                return None;
            };
            self.index += 1;
            if !self.bounds.admits(anchor) {
                self.done = true;
                return None;
            }
            if self.config.exceptions.iter().any(|excepted| excepted(anchor)) {
                tracing::trace!(anchor = %anchor, "Anchor excepted, skipping");
                continue;
            }
            // An anchor whose close overflows is dropped, not fatal; the
            // bounds check remains the stop condition.
            let Some(end) = self.config.rule.close(anchor) else {
                continue;
            };
            let Ok(occurrence) = Interval::new(anchor, end, false) else {
                continue;
            };
            self.yielded += 1;
            tracing::trace!(occurrence = %occurrence, "Yielding occurrence");
            return Some(occurrence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

    use crate::rule::Rule;

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).expect("valid date")
    }

    fn day_domain(start: NaiveDate, end: NaiveDate) -> Domain {
        Domain::Bounded(Interval::dates(start, end).expect("valid interval"))
    }

    fn days_rule() -> Rule {
        Rule::Days {
            unit: 1,
            offset: 0,
            span: 1,
        }
    }

    fn run(stage: &Stage) -> Vec<Interval> {
        stage.produce().expect("produces").collect()
    }

    #[test]
    fn a_bounded_base_yields_one_interval_per_unit() {
        let domain = day_domain(date(2012, 1, 1), date(2012, 1, 11));
        let stage = Stage::chain(Parent::Root(domain), days_rule()).expect("valid rule");
        let occurrences = run(&stage);
        assert_eq!(occurrences.len(), 10);
        assert_eq!(
            occurrences[0],
            Interval::dates(date(2012, 1, 1), date(2012, 1, 2)).expect("valid interval")
        );
        assert_eq!(
            occurrences[9],
            Interval::dates(date(2012, 1, 10), date(2012, 1, 11)).expect("valid interval")
        );
    }

    #[test]
    fn stepping_takes_the_ceiling_of_the_division() {
        let domain = day_domain(date(2012, 1, 1), date(2012, 1, 11));
        let stage = Stage::chain(Parent::Root(domain), days_rule())
            .expect("valid rule")
            .step_by(3)
            .expect("valid step");
        let starts: Vec<_> = run(&stage).iter().map(|i| i.start().date().day()).collect();
        assert_eq!(starts, vec![1, 4, 7, 10]);
    }

    #[test]
    fn seconds_expansion_honors_step_and_offset() {
        let start = date(2012, 2, 13).and_time(NaiveTime::from_hms_opt(13, 46, 25).expect("t"));
        let end = date(2012, 2, 13).and_time(NaiveTime::from_hms_opt(13, 46, 45).expect("t"));
        let domain = Domain::Bounded(Interval::floating(start, end).expect("valid interval"));
        let seconds = Rule::Seconds {
            unit: 1,
            offset: 0,
            span: 1,
        };

        let plain = Stage::chain(Parent::Root(domain), seconds).expect("valid rule");
        assert_eq!(run(&plain).len(), 20);

        let stepped = Stage::chain(Parent::Root(domain), seconds)
            .expect("valid rule")
            .step_by(3)
            .expect("valid step");
        assert_eq!(run(&stepped).len(), 7);

        let offset = Stage::chain(Parent::Root(domain), seconds)
            .expect("valid rule")
            .offset_by(5)
            .expect("valid offset");
        assert_eq!(run(&offset).len(), 15);
    }

    #[test]
    fn limit_caps_the_yield_without_erroring() {
        let domain = day_domain(date(2012, 1, 1), date(2012, 2, 1));
        let stage = Stage::chain(Parent::Root(domain), days_rule())
            .expect("valid rule")
            .limit_to(1)
            .expect("valid limit");
        assert_eq!(run(&stage).len(), 1);
    }

    #[test]
    fn exceptions_skip_without_truncating() {
        // 2012-01-02 is a Monday; two full weeks hold ten weekdays.
        let domain = day_domain(date(2012, 1, 2), date(2012, 1, 16));
        let stage = Stage::chain(Parent::Root(domain), days_rule())
            .expect("valid rule")
            .except(|anchor| matches!(anchor.date().weekday(), Weekday::Sat | Weekday::Sun));
        let occurrences = run(&stage);
        assert_eq!(occurrences.len(), 10);
        assert!(
            occurrences
                .iter()
                .all(|i| !matches!(i.start().date().weekday(), Weekday::Sat | Weekday::Sun))
        );
    }

    #[test]
    fn each_parent_interval_restarts_the_expansion() {
        let domain = day_domain(date(2012, 1, 1), date(2012, 3, 1));
        let months = Stage::chain(Parent::Root(domain), Rule::Months { offset: 0, span: 1 })
            .expect("valid rule");
        let tenths = Stage::chain(
            Parent::Stage(Box::new(months)),
            Rule::DayOfMonth { day: 10, span: 1 },
        )
        .expect("valid rule")
        .limit_to(1)
        .expect("valid limit");
        let occurrences = run(&tenths);
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].start(), TimePoint::Day(date(2012, 1, 10)));
        assert_eq!(occurrences[1].start(), TimePoint::Day(date(2012, 2, 10)));
    }

    #[test]
    fn an_open_domain_never_stops_on_its_own() {
        let domain = Domain::Onward(TimePoint::Day(date(2012, 1, 30)));
        let stage = Stage::chain(Parent::Root(domain), days_rule()).expect("valid rule");
        let starts: Vec<_> = stage
            .produce()
            .expect("produces")
            .take(3)
            .map(|i| i.start())
            .collect();
        assert_eq!(
            starts,
            vec![
                TimePoint::Day(date(2012, 1, 30)),
                TimePoint::Day(date(2012, 1, 31)),
                TimePoint::Day(date(2012, 2, 1)),
            ]
        );
    }

    #[test]
    fn an_open_domain_still_starts_at_its_own_edge() {
        // Matches the bounded rule: an anchor placed before the range start
        // ends the expansion.
        let domain = Domain::Onward(TimePoint::Day(date(2012, 1, 10)));
        let stage = Stage::chain(Parent::Root(domain), days_rule())
            .expect("valid rule")
            .offset_by(-3)
            .expect("valid offset");
        assert_eq!(stage.produce().expect("produces").next(), None);
    }

    #[test]
    fn the_sequence_reports_its_stage_in_debug() {
        let domain = day_domain(date(2012, 1, 1), date(2012, 1, 3));
        let stage = Stage::chain(Parent::Root(domain), days_rule()).expect("valid rule");
        let rendered = format!("{:?}", stage.produce().expect("produces"));
        assert!(rendered.starts_with("Occurrences"));
    }

    #[test]
    fn production_restarts_cleanly_per_call() {
        let domain = day_domain(date(2012, 1, 1), date(2012, 1, 8));
        let stage = Stage::chain(Parent::Root(domain), days_rule()).expect("valid rule");
        assert_eq!(run(&stage), run(&stage));
    }
}
