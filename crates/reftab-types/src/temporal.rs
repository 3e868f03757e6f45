use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};

use crate::error::{TypeError, TypeResult};

/// Naive local formats accepted after RFC 3339 has been tried.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A datetime field value.
///
/// Timestamps keep whether they were written with an explicit UTC offset so
/// that encoding reproduces the ISO-8601 shape they were parsed from: a
/// naive value is written as `2024-03-01T09:30:00`, an offset value as
/// `2024-03-01T09:30:00+02:00`.
///
/// Ordering compares naive values by their wall-clock reading and offset
/// values by their UTC instant, so mixed collections still sort totally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// Wall-clock datetime without offset information.
    Naive(NaiveDateTime),
    /// Datetime carrying a fixed UTC offset.
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse an ISO-8601 string.
    ///
    /// Accepts RFC 3339 (offset or `Z`), naive `YYYY-MM-DDTHH:MM:SS[.fff]`
    /// (with `T` or a space), and a bare `YYYY-MM-DD`, read as midnight.
    pub fn parse(text: &str) -> TypeResult<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::Offset(dt));
        }
        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(Self::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
            .ok_or_else(|| TypeError::InvalidDateTime(text.to_string()))
    }

    /// Format as ISO-8601.
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Offset(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }

    /// The instant used for ordering.
    pub fn sort_key(&self) -> NaiveDateTime {
        match self {
            Self::Naive(dt) => *dt,
            Self::Offset(dt) => dt.naive_utc(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Naive(_) => 0,
            Self::Offset(_) => 1,
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Offset(dt)
    }
}
