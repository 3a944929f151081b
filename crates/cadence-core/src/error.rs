use thiserror::Error;

use crate::point::PointKind;

/// Core error type for interval construction and algebra.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Type mismatch: {left} is not comparable with {right}")]
    TypeMismatch { left: PointKind, right: PointKind },

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
