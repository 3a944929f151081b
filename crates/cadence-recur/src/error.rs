use thiserror::Error;

use crate::clock::ClockParseError;

/// Recurrence construction and expansion errors
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Invalid configuration: {0}")]
    Configuration(&'static str),

    #[error("Clock parse error: {0}")]
    ClockParse(#[from] ClockParseError),

    #[error(transparent)]
    Core(#[from] cadence_core::CoreError),
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
