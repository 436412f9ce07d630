//! Clock time handling for timetables.
//!
//! Timetables publish departures as wall-clock times of day ("08:05",
//! "8:05", "08.05"). The router works in absolute minutes since the start of
//! the service day, so this module also provides the conversions between the
//! two, including wrapping past midnight.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

/// Minutes in one service day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day with minute precision.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ClockTime;
///
/// let time = ClockTime::parse_hhmm("8:05").unwrap();
/// assert_eq!(time.to_string(), "08:05");
/// assert_eq!(time.minutes(), 485);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Midnight, the start of the service day.
    pub const MIDNIGHT: ClockTime = ClockTime(NaiveTime::MIN);

    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Convert an absolute minute count into a time of day, wrapping at
    /// midnight.
    ///
    /// ```
    /// use transit_server::domain::ClockTime;
    ///
    /// assert_eq!(ClockTime::from_minutes_wrapping(1450).to_string(), "00:10");
    /// ```
    pub fn from_minutes_wrapping(minutes: u32) -> Self {
        let wrapped = minutes % MINUTES_PER_DAY;
        let time = NaiveTime::from_hms_opt(wrapped / 60, wrapped % 60, 0).unwrap_or(NaiveTime::MIN);
        Self(time)
    }

    /// Parse a time from "HH:MM" or "H:MM" format.
    ///
    /// A '.' separator is accepted in place of ':' since several published
    /// timetables use it.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    /// assert!(ClockTime::parse_hhmm("7:45").is_ok());
    /// assert!(ClockTime::parse_hhmm("07.45").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("0745").is_err());
    /// assert!(ClockTime::parse_hhmm("07:5").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let (hours, minutes) = s
            .split_once([':', '.'])
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        if hours.is_empty() || hours.len() > 2 {
            return Err(TimeError::new("expected one or two hour digits"));
        }
        if minutes.len() != 2 {
            return Err(TimeError::new("expected two minute digits"));
        }

        let hour = parse_digits(hours).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute =
            parse_digits(minutes).ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::from_hm(hour, minute)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Returns the underlying chrono time.
    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// Minutes from `self` until `later`, wrapping past midnight when
    /// `later` is earlier in the day.
    ///
    /// ```
    /// use transit_server::domain::ClockTime;
    ///
    /// let late = ClockTime::parse_hhmm("23:50").unwrap();
    /// let early = ClockTime::parse_hhmm("00:15").unwrap();
    /// assert_eq!(late.minutes_until(early), 25);
    /// ```
    pub fn minutes_until(&self, later: ClockTime) -> u32 {
        let diff = i64::from(later.minutes()) - i64::from(self.minutes());
        if diff < 0 {
            (diff + i64::from(MINUTES_PER_DAY)) as u32
        } else {
            diff as u32
        }
    }
}

/// Parse a short run of ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}
