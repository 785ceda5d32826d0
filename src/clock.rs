//! Build-time clock and symbolic date/time inputs.
//!
//! Symbolic inputs such as `today` or `tomorrow` are kept unresolved until the
//! file is sealed, then resolved against a single reading of the session's
//! [`Clock`]. Injecting a [`FixedClock`] makes every rendered date
//! deterministic.

use crate::field::FieldError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// Source of the "current time" used to resolve symbolic dates.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Returns `None` if the date or time components are out of range.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A date field input, possibly relative to the build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    Today,
    Tomorrow,
    On(NaiveDate),
}

impl DateInput {
    pub fn is_symbolic(&self) -> bool {
        !matches!(self, DateInput::On(_))
    }

    pub fn resolve(&self, now: NaiveDateTime) -> NaiveDate {
        let today = now.date();
        match self {
            DateInput::Today => today,
            DateInput::Tomorrow => today.succ_opt().unwrap_or(today),
            DateInput::On(date) => *date,
        }
    }
}

impl FromStr for DateInput {
    type Err = FieldError;

    /// Accepts `today`/`now`, `tomorrow`, `YYMMDD`, `YYYY-MM-DD` and ISO date-times.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "today" | "now" => return Ok(DateInput::Today),
            "tomorrow" => return Ok(DateInput::Tomorrow),
            _ => {}
        }

        if trimmed.len() == 6 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let yy: i32 = trimmed[..2].parse().map_err(|_| FieldError::InvalidDate)?;
            let mm: u32 = trimmed[2..4].parse().map_err(|_| FieldError::InvalidDate)?;
            let dd: u32 = trimmed[4..].parse().map_err(|_| FieldError::InvalidDate)?;
            return NaiveDate::from_ymd_opt(2000 + yy, mm, dd)
                .map(DateInput::On)
                .ok_or(FieldError::InvalidDate);
        }

        if let Ok(date) = trimmed.parse::<NaiveDate>() {
            return Ok(DateInput::On(date));
        }
        if let Ok(datetime) = trimmed.parse::<NaiveDateTime>() {
            return Ok(DateInput::On(datetime.date()));
        }

        Err(FieldError::InvalidDate)
    }
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateInput::Today => write!(f, "today"),
            DateInput::Tomorrow => write!(f, "tomorrow"),
            DateInput::On(date) => write!(f, "{}", date.format("%y%m%d")),
        }
    }
}

/// A time field input, possibly relative to the build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    Now,
    At(NaiveTime),
}

impl TimeInput {
    pub fn is_symbolic(&self) -> bool {
        matches!(self, TimeInput::Now)
    }

    pub fn resolve(&self, now: NaiveDateTime) -> NaiveTime {
        match self {
            TimeInput::Now => now.time(),
            TimeInput::At(time) => *time,
        }
    }
}

impl FromStr for TimeInput {
    type Err = FieldError;

    /// Accepts `now`, `HHMM`, `HH:MM` and ISO date-times.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("now") {
            return Ok(TimeInput::Now);
        }

        if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let hh: u32 = trimmed[..2].parse().map_err(|_| FieldError::InvalidTime)?;
            let mm: u32 = trimmed[2..].parse().map_err(|_| FieldError::InvalidTime)?;
            return NaiveTime::from_hms_opt(hh, mm, 0)
                .map(TimeInput::At)
                .ok_or(FieldError::InvalidTime);
        }

        if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
            return Ok(TimeInput::At(time));
        }
        if let Ok(datetime) = trimmed.parse::<NaiveDateTime>() {
            return Ok(TimeInput::At(datetime.time()));
        }

        Err(FieldError::InvalidTime)
    }
}

impl fmt::Display for TimeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInput::Now => write!(f, "now"),
            TimeInput::At(time) => write!(f, "{}", time.format("%H%M")),
        }
    }
}
