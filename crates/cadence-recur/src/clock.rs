//! Human clock-of-day input: "2:00pm", "14:00", "11:00 UTC", "09:30:15 +09:00".

use chrono::NaiveTime;
use thiserror::Error;

/// Clock-time parsing errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockParseError {
    #[error("Empty clock string")]
    Empty,
    #[error("Malformed clock string")]
    Malformed,
    #[error("Hour out of range")]
    HourOutOfRange,
    #[error("Minute out of range")]
    MinuteOutOfRange,
    #[error("Second out of range")]
    SecondOutOfRange,
    #[error("Unknown time zone abbreviation")]
    UnknownZone,
    #[error("Malformed UTC offset")]
    MalformedOffset,
}

/// Common abbreviations accepted after the clock digits, in seconds east of
/// UTC. Anything else must be given as an explicit "+HH:MM" offset.
const ZONE_ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// A time of day plus an optional fixed UTC offset.
///
/// Without an offset the clock is floating: rules that consume it re-derive
/// the UTC offset from each occurrence's own date. With one, every occurrence
/// carries exactly that offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClockTime {
    time: NaiveTime,
    offset_seconds: Option<i32>,
}

impl ClockTime {
    /// ## Summary
    /// Parses a human time-of-day string.
    ///
    /// Accepted shapes: 24-hour "14:00" / "09:30:15", 12-hour "2:00pm" with
    /// the meridiem attached or space-separated, bare hours "2pm", and an
    /// optional trailing zone, either an abbreviation ("EST", "UTC") or a
    /// numeric offset ("+09:00", "-0500").
    ///
    /// ## Errors
    /// [`ClockParseError`] describing the first problem found: an empty or
    /// malformed string, an out-of-range field, or an unrecognized zone.
    pub fn parse(input: &str) -> Result<Self, ClockParseError> {
        let mut tokens = input.split_whitespace();
        let first = tokens.next().ok_or(ClockParseError::Empty)?;
        let (core, mut meridiem) = split_meridiem_suffix(first);

        let mut zone: Option<&str> = None;
        for token in tokens {
            if meridiem.is_none() && zone.is_none() {
                if let Some(found) = meridiem_token(token) {
                    meridiem = Some(found);
                    continue;
                }
            }
            if zone.is_none() {
                zone = Some(token);
                continue;
            }
            return Err(ClockParseError::Malformed);
        }

        let (hour, minute, second) = parse_fields(core)?;
        let hour = apply_meridiem(hour, meridiem)?;
        if minute > 59 {
            return Err(ClockParseError::MinuteOutOfRange);
        }
        if second > 59 {
            return Err(ClockParseError::SecondOutOfRange);
        }
        let time =
            NaiveTime::from_hms_opt(hour, minute, second).ok_or(ClockParseError::Malformed)?;
        let offset_seconds = zone.map(parse_zone).transpose()?;
        Ok(Self {
            time,
            offset_seconds,
        })
    }

    /// A clock with no fixed offset.
    #[must_use]
    pub const fn floating(time: NaiveTime) -> Self {
        Self {
            time,
            offset_seconds: None,
        }
    }

    /// A clock pinned to a fixed offset in seconds east of UTC.
    #[must_use]
    pub const fn at_offset(time: NaiveTime, offset_seconds: i32) -> Self {
        Self {
            time,
            offset_seconds: Some(offset_seconds),
        }
    }

    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub const fn offset_seconds(&self) -> Option<i32> {
        self.offset_seconds
    }
}

impl std::str::FromStr for ClockTime {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Strips an attached "am"/"pm" suffix ("2:00pm") off the digit core.
fn split_meridiem_suffix(token: &str) -> (&str, Option<Meridiem>) {
    if token.len() > 2 && token.is_char_boundary(token.len() - 2) {
        let (head, tail) = token.split_at(token.len() - 2);
        if let Some(meridiem) = meridiem_token(tail) {
            return (head, Some(meridiem));
        }
    }
    (token, None)
}

fn meridiem_token(token: &str) -> Option<Meridiem> {
    if token.eq_ignore_ascii_case("am") {
        Some(Meridiem::Am)
    } else if token.eq_ignore_ascii_case("pm") {
        Some(Meridiem::Pm)
    } else {
        None
    }
}

/// Splits "H", "H:MM", or "H:MM:SS" into raw field values.
fn parse_fields(core: &str) -> Result<(u32, u32, u32), ClockParseError> {
    let mut fields = core.split(':');
    let hour = parse_field(fields.next().ok_or(ClockParseError::Malformed)?)?;
    let minute = fields.next().map(parse_field).transpose()?.unwrap_or(0);
    let second = fields.next().map(parse_field).transpose()?.unwrap_or(0);
    if fields.next().is_some() {
        return Err(ClockParseError::Malformed);
    }
    Ok((hour, minute, second))
}

fn parse_field(field: &str) -> Result<u32, ClockParseError> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClockParseError::Malformed);
    }
    field.parse().map_err(|_| ClockParseError::Malformed)
}

fn apply_meridiem(hour: u32, meridiem: Option<Meridiem>) -> Result<u32, ClockParseError> {
    match meridiem {
        None if hour <= 23 => Ok(hour),
        Some(Meridiem::Am) if (1..=12).contains(&hour) => Ok(hour % 12),
        Some(Meridiem::Pm) if (1..=12).contains(&hour) => Ok(hour % 12 + 12),
        _ => Err(ClockParseError::HourOutOfRange),
    }
}

fn parse_zone(token: &str) -> Result<i32, ClockParseError> {
    if token.starts_with('+') || token.starts_with('-') {
        return parse_numeric_offset(token);
    }
    ZONE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| token.eq_ignore_ascii_case(name))
        .map(|&(_, seconds)| seconds)
        .ok_or(ClockParseError::UnknownZone)
}

/// Parses "+HH:MM", "+HHMM", or "+HH" into seconds east of UTC.
fn parse_numeric_offset(token: &str) -> Result<i32, ClockParseError> {
    let (sign, rest) = match token.split_at(1) {
        ("+", rest) => (1i32, rest),
        ("-", rest) => (-1i32, rest),
        _ => return Err(ClockParseError::MalformedOffset),
    };
    let (hour_part, minute_part) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, ""),
    };
    let hours = parse_field(hour_part).map_err(|_| ClockParseError::MalformedOffset)?;
    let minutes = if minute_part.is_empty() {
        0
    } else {
        parse_field(minute_part).map_err(|_| ClockParseError::MalformedOffset)?
    };
    if hours > 23 || minutes > 59 {
        return Err(ClockParseError::MalformedOffset);
    }
    let hours = i32::try_from(hours).map_err(|_| ClockParseError::MalformedOffset)?;
    let minutes = i32::try_from(minutes).map_err(|_| ClockParseError::MalformedOffset)?;
    Ok(sign * (hours * 3600 + minutes * 60))
}
