//! Simulation Clock Types
//!
//! Monthly simulation time with both a tick counter and a calendar date.
//!
//! # Example
//!
//! ```
//! use water_events::SimClock;
//!
//! let mut clock = SimClock::new(1990, 12).unwrap();
//! clock.advance();
//! assert_eq!(clock.tick, 1);
//! assert_eq!(clock.date.to_string(), "1991-01");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of months in a simulated year.
pub const MONTHS_PER_YEAR: u8 = 12;

/// Error raised when a clock would be built on an invalid month.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u8),
}

/// Error type for parsing dates and clock fields from strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseClockError {
    #[error("invalid date format: '{0}', expected 'YYYY-MM'")]
    InvalidFormat(String),
    #[error("invalid year: '{0}'")]
    InvalidYear(String),
    #[error("invalid month: '{0}'")]
    InvalidMonth(String),
    #[error("unknown clock field: '{0}'")]
    UnknownField(String),
}

/// Calendar part of the clock.
///
/// Serializes to strings like "1998-07".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

impl YearMonth {
    /// Creates a date, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u8) -> Result<Self, ClockError> {
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(ClockError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Advances by one month, rolling December into the next January.
    pub fn advance_month(&mut self) {
        if self.month == MONTHS_PER_YEAR {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }

    /// Number of months from `self` up to `later`, or zero if `later` is not after `self`.
    pub fn months_until(&self, later: YearMonth) -> u64 {
        let from = i64::from(self.year) * 12 + i64::from(self.month);
        let to = i64::from(later.year) * 12 + i64::from(later.month);
        u64::try_from(to - from).unwrap_or(0)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ParseClockError;

    /// Parses a date from a string like "1998-07".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_part, month_part) = s
            .rsplit_once('-')
            .ok_or_else(|| ParseClockError::InvalidFormat(s.to_string()))?;

        let year = year_part
            .parse::<i32>()
            .map_err(|_| ParseClockError::InvalidYear(year_part.to_string()))?;
        let month = month_part
            .parse::<u8>()
            .map_err(|_| ParseClockError::InvalidMonth(month_part.to_string()))?;

        YearMonth::new(year, month).map_err(|_| ParseClockError::InvalidMonth(month_part.to_string()))
    }
}

// Serialize the date as a plain string
impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The current simulated instant.
///
/// Contains a monotonic tick counter (one tick per month) and the calendar
/// date. Only the host loop advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Months elapsed since the clock was created.
    pub tick: u64,
    /// Calendar date of the current tick.
    pub date: YearMonth,
}

impl SimClock {
    /// Creates a clock at tick 0 on the given date.
    pub fn new(year: i32, month: u8) -> Result<Self, ClockError> {
        Ok(Self {
            tick: 0,
            date: YearMonth::new(year, month)?,
        })
    }

    /// Advances the clock by one month.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.date.advance_month();
    }

    pub fn year(&self) -> i32 {
        self.date.year
    }

    pub fn month(&self) -> u8 {
        self.date.month
    }

    /// Returns true on the last month of the year.
    pub fn is_year_end(&self) -> bool {
        self.date.month == MONTHS_PER_YEAR
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tick {})", self.date, self.tick)
    }
}

/// A clock field that time conditions can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockField {
    Year,
    Month,
}

impl ClockField {
    /// Reads this field off a clock.
    pub fn value(self, clock: &SimClock) -> i64 {
        match self {
            ClockField::Year => i64::from(clock.year()),
            ClockField::Month => i64::from(clock.month()),
        }
    }

    /// Returns true if `value` can ever be observed for this field.
    pub fn admits(self, value: i64) -> bool {
        match self {
            ClockField::Year => i32::try_from(value).is_ok(),
            ClockField::Month => (1..=i64::from(MONTHS_PER_YEAR)).contains(&value),
        }
    }
}

impl fmt::Display for ClockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockField::Year => write!(f, "year"),
            ClockField::Month => write!(f, "month"),
        }
    }
}

impl FromStr for ClockField {
    type Err = ParseClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(ClockField::Year),
            "month" => Ok(ClockField::Month),
            _ => Err(ParseClockError::UnknownField(s.to_string())),
        }
    }
}
