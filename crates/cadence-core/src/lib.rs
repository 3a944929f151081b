//! Calendar points, intervals, and the relational algebra over them.
//!
//! A [`TimePoint`] is a calendar date, a floating local timestamp, or a
//! fixed-offset timestamp; an [`Interval`] is an ordered pair of same-kind
//! points with an inclusive or exclusive end. The algebra methods on
//! [`Interval`] (intersection, precedence, adjacency, containment) normalize
//! mixed-granularity operands before comparing and refuse the one pairing
//! with no defined order, floating against fixed-offset.

pub mod error;

mod algebra;
mod interval;
mod normalize;
mod point;

pub use error::{CoreError, CoreResult};
pub use interval::Interval;
pub use point::{PointKind, TimePoint, fixed_datetime};
