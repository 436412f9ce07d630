//! Service calendar categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a day-type string matches no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day type: {0:?}")]
pub struct InvalidDayType(String);

/// The service calendar a trip operates under.
///
/// Day-type matching is strict: a weekday query never sees Saturday trips
/// and there is no holiday fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    #[default]
    Weekday,
    Saturday,
    Sunday,
    Holiday,
}

impl DayType {
    pub const ALL: [DayType; 4] = [
        DayType::Weekday,
        DayType::Saturday,
        DayType::Sunday,
        DayType::Holiday,
    ];

    /// Normalize a free-text day label from schedule data.
    ///
    /// Matching is by substring on the upper-cased label, so headings such
    /// as "Monday - Friday" or "Saturdays only" are recognised.
    ///
    /// ```
    /// use transit_server::domain::DayType;
    ///
    /// assert_eq!(DayType::normalize("Monday to Friday").unwrap(), DayType::Weekday);
    /// assert_eq!(DayType::normalize("saturday").unwrap(), DayType::Saturday);
    /// assert!(DayType::normalize("someday").is_err());
    /// ```
    pub fn normalize(raw: &str) -> Result<Self, InvalidDayType> {
        let upper = raw.trim().to_uppercase();

        if upper.contains("MONDAY") || upper.contains("FRIDAY") || upper.contains("WEEKDAY") {
            Ok(DayType::Weekday)
        } else if upper.contains("SATURDAY") {
            Ok(DayType::Saturday)
        } else if upper.contains("SUNDAY") {
            Ok(DayType::Sunday)
        } else if upper.contains("HOLIDAY") {
            Ok(DayType::Holiday)
        } else {
            Err(InvalidDayType(raw.to_string()))
        }
    }

    /// Returns the canonical upper-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "WEEKDAY",
            DayType::Saturday => "SATURDAY",
            DayType::Sunday => "SUNDAY",
            DayType::Holiday => "HOLIDAY",
        }
    }
}

impl FromStr for DayType {
    type Err = InvalidDayType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_labels_parse() {
        for day in DayType::ALL {
            assert_eq!(DayType::normalize(day.as_str()).unwrap(), day);
        }
    }

    #[test]
    fn weekday_aliases() {
        assert_eq!(DayType::normalize("MONDAY").unwrap(), DayType::Weekday);
        assert_eq!(DayType::normalize("Mon-Friday").unwrap(), DayType::Weekday);
        assert_eq!(DayType::normalize("weekdays").unwrap(), DayType::Weekday);
    }

    #[test]
    fn weekday_wins_over_later_matches() {
        // "Monday - Saturday" mentions both; the weekday check runs first.
        assert_eq!(
            DayType::normalize("Monday - Saturday").unwrap(),
            DayType::Weekday
        );
        assert_eq!(
            DayType::normalize("Sunday & Public Holiday").unwrap(),
            DayType::Sunday
        );
    }

    #[test]
    fn unknown_label_rejected() {
        let err = DayType::normalize("daily").unwrap_err();
        assert_eq!(err.to_string(), "unknown day type: \"daily\"");
        assert!(DayType::normalize("").is_err());
    }

    #[test]
    fn serde_uses_upper_case() {
        let json = serde_json::to_string(&DayType::Saturday).unwrap();
        assert_eq!(json, "\"SATURDAY\"");
        let parsed: DayType = serde_json::from_str("\"HOLIDAY\"").unwrap();
        assert_eq!(parsed, DayType::Holiday);
    }

    #[test]
    fn default_is_weekday() {
        assert_eq!(DayType::default(), DayType::Weekday);
    }
}
