//! Where a wall-clock reading lives: nowhere in particular, at one fixed
//! UTC offset, or in an IANA zone whose offset shifts with DST.

use cadence_core::{TimePoint, fixed_datetime};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// The zone context a time-of-day rule resolves its occurrences in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Zone {
    /// No UTC offset; occurrences stay floating.
    Floating,
    /// Every occurrence carries exactly this offset.
    Fixed(FixedOffset),
    /// The offset is re-derived from each occurrence's own date.
    Iana(Tz),
}

impl Zone {
    #[must_use]
    pub(crate) const fn is_floating(self) -> bool {
        matches!(self, Self::Floating)
    }

    /// Places a wall-clock reading into this zone.
    pub(crate) fn resolve(self, local: NaiveDateTime) -> TimePoint {
        match self {
            Self::Floating => TimePoint::Floating(local),
            Self::Fixed(offset) => TimePoint::Fixed(fixed_datetime(local, offset)),
            Self::Iana(tz) => TimePoint::Fixed(resolve_in_tz(tz, local)),
        }
    }
}

/// Maps a wall-clock reading into `tz`.
///
/// A reading inside a spring-forward gap does not exist on the local clock;
/// it shifts forward one hour and retries, the common lenient treatment. A
/// fold reading occurs twice; the first occurrence (before the shift) wins.
fn resolve_in_tz(tz: Tz, local: NaiveDateTime) -> DateTime<FixedOffset> {
    if let Some(dt) = map_local(tz, local) {
        return dt;
    }
    let shifted = local
        .checked_add_signed(chrono::Duration::hours(1))
        .unwrap_or(local);
    map_local(tz, shifted).unwrap_or_else(|| tz.from_utc_datetime(&local).fixed_offset())
}

fn map_local(tz: Tz, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(dt1, _dt2) => Some(dt1.fixed_offset()),
        LocalResult::None => None,
    }
}
