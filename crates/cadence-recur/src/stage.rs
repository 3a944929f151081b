//! Recurrence chains: a root domain wrapped by one configured rule per link.
//!
//! A [`Stage`] owns its parent, so a chain is a singly linked, acyclic
//! structure built by non-destructive attachment. All traversal state lives
//! in the sequence returned by [`Stage::produce`]; the chain itself is
//! immutable and may be produced repeatedly without cross-talk.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use cadence_core::{CoreError, Interval, PointKind, TimePoint};

use crate::error::{RecurError, RecurResult};
use crate::produce::Occurrences;
use crate::rule::Rule;

/// Predicate over candidate anchors; anchors it accepts are skipped.
pub(crate) type ExceptionFn = Arc<dyn Fn(TimePoint) -> bool + Send + Sync>;

/// The root of a chain: what the innermost stage expands over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Expansion stays within a bounded interval.
    Bounded(Interval),
    /// Expansion runs forward from a point with no upper bound. A chain
    /// rooted here is infinite unless some stage carries a limit; consuming
    /// it without an external stop is on the caller.
    Onward(TimePoint),
}

impl Domain {
    pub(crate) fn kind(self) -> PointKind {
        match self {
            Self::Bounded(interval) => interval.kind(),
            Self::Onward(point) => point.kind(),
        }
    }
}

/// One stage's parent: the chain root or the stage beneath it.
#[derive(Debug, Clone)]
pub enum Parent {
    Root(Domain),
    Stage(Box<Stage>),
}

/// One link of a recurrence chain: a rule plus its stride, limit, and
/// exception predicates, over a parent.
#[derive(Debug, Clone)]
pub struct Stage {
    pub(crate) parent: Parent,
    pub(crate) config: StageConfig,
}

#[derive(Clone)]
pub(crate) struct StageConfig {
    pub(crate) rule: Rule,
    pub(crate) step: u32,
    pub(crate) limit: Option<usize>,
    pub(crate) exceptions: Vec<ExceptionFn>,
}

impl fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageConfig")
            .field("rule", &self.rule)
            .field("step", &self.step)
            .field("limit", &self.limit)
            .field("exceptions", &self.exceptions.len())
            .finish()
    }
}

impl Stage {
    pub(crate) fn chain(parent: Parent, rule: Rule) -> RecurResult<Self> {
        rule.validate()?;
        tracing::debug!(rule = ?rule, "Attaching stage to recurrence chain");
        Ok(Self {
            parent,
            config: StageConfig {
                rule,
                step: 1,
                limit: None,
                exceptions: Vec::new(),
            },
        })
    }

    /// ## Summary
    /// Widens the stride: only every `step`-th candidate anchor is taken.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `step` is zero.
    pub fn step_by(mut self, step: u32) -> RecurResult<Self> {
        if step == 0 {
            return Err(RecurError::Configuration("step must be positive"));
        }
        self.config.step = step;
        Ok(self)
    }

    /// ## Summary
    /// Caps this stage at `limit` yielded occurrences per parent interval.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when `limit` is zero.
    pub fn limit_to(mut self, limit: usize) -> RecurResult<Self> {
        if limit == 0 {
            return Err(RecurError::Configuration("limit must be positive"));
        }
        self.config.limit = Some(limit);
        Ok(self)
    }

    /// ## Summary
    /// Replaces the rule's starting offset, counted in the rule's native
    /// unit (seconds, days, weeks, months, or years).
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the rule has no offset parameter
    /// or the count does not fit it.
    pub fn offset_by(mut self, offset: i64) -> RecurResult<Self> {
        self.config.rule = self.config.rule.with_offset(offset)?;
        Ok(self)
    }

    /// ## Summary
    /// Replaces the rule's occurrence span, counted in the rule's native
    /// unit.
    ///
    /// ## Errors
    /// [`RecurError::Configuration`] when the rule's span is not a free
    /// parameter or the count does not fit it.
    pub fn lasting(mut self, span: i64) -> RecurResult<Self> {
        self.config.rule = self.config.rule.with_span(span)?;
        Ok(self)
    }

    /// Adds an exception predicate; anchors it accepts are skipped without
    /// counting toward the limit or ending the expansion.
    #[must_use]
    pub fn except<F>(mut self, predicate: F) -> Self
    where
        F: Fn(TimePoint) -> bool + Send + Sync + 'static,
    {
        self.config.exceptions.push(Arc::new(predicate));
        self
    }

    /// ## Summary
    /// Opens a fresh pass over the chain. Each call restarts from the root;
    /// nothing is cached on the chain itself.
    ///
    /// The sequence is finite iff the root is bounded or every unbounded
    /// path carries a limit.
    ///
    /// ## Errors
    /// [`RecurError::Core`] with a type mismatch when some stage's output
    /// cannot be compared within the next stage's domain, such as a
    /// floating clock rule over a fixed-offset root.
    #[tracing::instrument(skip(self), fields(rule = ?self.config.rule, step = self.config.step))]
    pub fn produce(&self) -> RecurResult<Occurrences<'_>> {
        self.output_kind()?;
        Ok(Occurrences::over(self))
    }

    /// ## Summary
    /// Whether any occurrence of this chain contains `point`.
    ///
    /// Occurrences are examined in production order. When the chain below
    /// provably yields ordered occurrences, the scan returns at the first
    /// hit or at the first occurrence starting after the point; otherwise
    /// (a parent stage whose spans outrun its step, say) it is exhaustive,
    /// since a later expansion can restart at an earlier anchor. Either
    /// way, on an unbounded chain that never reaches the point the scan
    /// runs as long as the production does.
    ///
    /// ## Errors
    /// [`RecurError::Core`] with a type mismatch when the point's kind
    /// differs from what the chain emits, or when the chain itself mixes
    /// incomparable kinds.
    pub fn covers(&self, point: TimePoint) -> RecurResult<bool> {
        let emitted = self.output_kind()?;
        if point.kind() != emitted {
            return Err(RecurError::Core(CoreError::TypeMismatch {
                left: point.kind(),
                right: emitted,
            }));
        }
        let ordered = self.starts_ordered();
        for occurrence in Occurrences::over(self) {
            if occurrence.contains(point)? {
                return Ok(true);
            }
            if ordered && point.try_cmp(occurrence.start())? == Ordering::Less {
                return Ok(false);
            }
        }
        Ok(false)
    }

    /// Whether this stage's occurrences are known to arrive in start order.
    ///
    /// True over the root, whose single expansion advances strictly. Over
    /// another stage it needs that stage's production ordered and disjoint,
    /// or a later expansion restarts behind the previous one. A day rule
    /// over sub-day parents is also out: widening two disjoint parents can
    /// land them on the same date and replay an earlier anchor.
    fn starts_ordered(&self) -> bool {
        match &self.parent {
            Parent::Root(_) => true,
            Parent::Stage(below) => {
                let aligned =
                    !self.config.rule.day_granular() || below.config.rule.day_granular();
                aligned && below.ordered_disjoint()
            }
        }
    }

    /// Start order plus no overlap between consecutive occurrences.
    fn ordered_disjoint(&self) -> bool {
        self.starts_ordered() && self.config.rule.spans_within_step(self.config.step)
    }

    /// The kind of point this stage emits, validating the whole chain below.
    #[tracing::instrument(level = "trace", skip(self), fields(rule = ?self.config.rule))]
    pub(crate) fn output_kind(&self) -> RecurResult<PointKind> {
        let input = match &self.parent {
            Parent::Root(domain) => domain.kind(),
            Parent::Stage(stage) => stage.output_kind()?,
        };
        self.config.rule.output_kind(input)
    }
}
