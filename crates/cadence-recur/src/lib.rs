//! Recurring sub-intervals over calendar and clock time.
//!
//! A base interval (or an open-ended start) is wrapped by rule stages, one
//! per granularity, and producing the outermost stage lazily pulls intervals
//! from its parent and expands each one independently. "Each month, its
//! second Thursday, at 2pm for an hour" is three chained stages:
//!
//! ```
//! use cadence_core::Interval;
//! use cadence_recur::Recurring;
//! use chrono::Weekday;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let year = Interval::dates("2012-01-01".parse()?, "2013-01-01".parse()?)?;
//! let chain = year
//!     .each_months(1)?
//!     .weekday(Weekday::Thu, 2)?
//!     .at_time_in("2:00pm", 3600, chrono_tz::America::New_York)?;
//! assert_eq!(chain.produce()?.count(), 12);
//! # Ok(())
//! # }
//! ```
//!
//! Chains are immutable; every [`Stage::produce`] call starts a fresh pass,
//! so one chain can back any number of consumers. A chain rooted in an open
//! domain with no limit anywhere is infinite, and consuming it without an
//! external stop (`take`, a break condition) will not terminate.

mod chaining;
mod clock;
mod error;
mod produce;
mod rule;
mod stage;
mod symbol;
mod zone;

pub use chaining::Recurring;
pub use clock::{ClockParseError, ClockTime};
pub use error::{RecurError, RecurResult};
pub use produce::Occurrences;
pub use stage::{Domain, Parent, Stage};
pub use symbol::WeekdaySet;
