use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, ParseError, Utc};
use serde::{Deserialize, Serialize};

/// A calendar day, used as the planner's primary key.
///
/// Callers hand the system timestamps of varying precision (wall-clock
/// milliseconds, nanosecond epochs); every timestamp falling within the same
/// UTC calendar day normalizes to the same `StudyDay`. All day arithmetic and
/// comparisons happen on this type, never on raw timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudyDay(NaiveDate);

impl StudyDay {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Truncates a timestamp to its UTC calendar day.
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    /// Truncates a nanosecond-precision Unix timestamp to its calendar day.
    #[must_use]
    pub fn from_timestamp_nanos(nanos: i64) -> Self {
        Self::from_datetime(DateTime::from_timestamp_nanos(nanos))
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The day `days` after this one (negative values go backwards).
    #[must_use]
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }
}

impl fmt::Display for StudyDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for StudyDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(NaiveDate::from_str(s)?))
    }
}

impl From<NaiveDate> for StudyDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<DateTime<Utc>> for StudyDay {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}
