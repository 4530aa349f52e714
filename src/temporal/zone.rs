//! The process-wide target timezone.
//!
//! Accepts IANA names (`Asia/Tokyo`, `Europe/Berlin`, `UTC`) and fixed
//! offsets (`+09:00`, `-0530`). IANA zones go through `chrono-tz`, so DST
//! transitions are honored; nothing here assumes a zero-DST zone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl TargetZone {
    /// Convert a UTC instant to local wall-clock time in this zone.
    ///
    /// The result keeps the offset that was in effect at that instant.
    pub fn to_local(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            TargetZone::Named(tz) => ts.with_timezone(tz).fixed_offset(),
            TargetZone::Fixed(offset) => ts.with_timezone(offset),
        }
    }

    /// Interpret a naive local datetime in this zone.
    ///
    /// Returns `None` for wall-clock times that are skipped (spring-forward)
    /// or repeated (fall-back) in the zone; callers should ask for an explicit
    /// offset in that case.
    pub fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            TargetZone::Named(tz) => match tz.from_local_datetime(&naive) {
                LocalResult::Single(dt) => Some(dt.fixed_offset()),
                _ => None,
            },
            TargetZone::Fixed(offset) => offset.from_local_datetime(&naive).single(),
        }
    }
}

impl Default for TargetZone {
    fn default() -> Self {
        TargetZone::Named(chrono_tz::Asia::Tokyo)
    }
}

impl FromStr for TargetZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('+') || s.starts_with('-') {
            return parse_fixed_offset(s)
                .map(TargetZone::Fixed)
                .ok_or_else(|| format!("Invalid UTC offset '{s}'. Expected +HH:MM or -HHMM."));
        }
        s.parse::<Tz>()
            .map(TargetZone::Named)
            .map_err(|e| format!("Unknown timezone '{s}': {e}"))
    }
}

impl fmt::Display for TargetZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetZone::Named(tz) => write!(f, "{tz}"),
            TargetZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

fn parse_fixed_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
