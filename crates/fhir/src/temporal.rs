//! Date and date-time parsing helpers.
//!
//! FHIR `date` values carry their own precision (`1975`, `1975-10`, `1975-10-10`), which the
//! redaction engine relies on. Input arrives either as ISO-8601 or in the German localized
//! form used by notification portals (`10.10.1975`, `10.1975`, `10.10.1975 14:30`).

use crate::{FhirError, FhirResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;

/// How much of a [`FhirDate`] is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// A calendar date with FHIR partial-date semantics.
///
/// A day is only ever present together with a month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FhirDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl FhirDate {
    /// A date known to year precision.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidTemporal`] for years outside `0..=9999`.
    pub fn from_year(year: i32) -> FhirResult<Self> {
        if !(0..=9999).contains(&year) {
            return Err(FhirError::InvalidTemporal(format!(
                "year {year} is outside 0000-9999"
            )));
        }
        Ok(Self {
            year,
            month: None,
            day: None,
        })
    }

    /// A date known to month precision.
    pub fn from_year_month(year: i32, month: u32) -> FhirResult<Self> {
        let base = Self::from_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(FhirError::InvalidTemporal(format!(
                "month {month} is outside 1-12"
            )));
        }
        Ok(Self {
            month: Some(month),
            ..base
        })
    }

    /// A date known to day precision. The day must exist in the calendar.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> FhirResult<Self> {
        let base = Self::from_year_month(year, month)?;
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(FhirError::InvalidTemporal(format!(
                "{year:04}-{month:02}-{day:02} is not a calendar date"
            )));
        }
        Ok(Self {
            day: Some(day),
            ..base
        })
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: Some(date.month()),
            day: Some(date.day()),
        }
    }

    /// Parses ISO-8601 (`yyyy`, `yyyy-MM`, `yyyy-MM-dd`) or localized
    /// (`MM.yyyy`, `dd.MM.yyyy`) text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidTemporal`] naming the input when it matches none of the
    /// supported patterns or does not describe a real calendar date.
    pub fn parse(text: &str) -> FhirResult<Self> {
        let trimmed = text.trim();
        let parsed = if trimmed.contains('.') {
            parse_localized_date(trimmed)
        } else {
            parse_iso_date(trimmed)
        };

        parsed.ok_or_else(|| {
            FhirError::InvalidTemporal(format!(
                "'{text}' is neither an ISO-8601 date nor dd.MM.yyyy"
            ))
        })?
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn precision(&self) -> DatePrecision {
        match (self.month, self.day) {
            (Some(_), Some(_)) => DatePrecision::Day,
            (Some(_), None) => DatePrecision::Month,
            _ => DatePrecision::Year,
        }
    }

    /// Drops the day of month, keeping year or month precision as it was.
    pub fn truncate_to_month(&self) -> Self {
        Self { day: None, ..*self }
    }
}

/// Splits `text` on `sep` and requires every part to be ASCII digits of an allowed length.
fn digit_parts<'a>(text: &'a str, sep: char, lengths: &[&[usize]]) -> Option<Vec<&'a str>> {
    let parts: Vec<&str> = text.split(sep).collect();
    let allowed = lengths.get(parts.len().checked_sub(1)?)?;
    let ok = parts
        .iter()
        .zip(allowed.iter())
        .all(|(p, len)| p.len() == *len && p.bytes().all(|b| b.is_ascii_digit()));
    ok.then_some(parts)
}

// `None` means "no pattern matched"; `Some(Err(..))` means a pattern matched but the date
// is not real.
fn parse_iso_date(text: &str) -> Option<FhirResult<FhirDate>> {
    let parts = digit_parts(text, '-', &[&[4], &[4, 2], &[4, 2, 2]])?;
    let nums: Vec<u32> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    let year = i32::try_from(nums[0]).ok()?;
    Some(match nums.len() {
        1 => FhirDate::from_year(year),
        2 => FhirDate::from_year_month(year, nums[1]),
        _ => FhirDate::from_ymd(year, nums[1], nums[2]),
    })
}

fn parse_localized_date(text: &str) -> Option<FhirResult<FhirDate>> {
    let parts: Vec<&str> = text.split('.').collect();
    let valid = |p: &&str, max: usize| {
        !p.is_empty() && p.len() <= max && p.bytes().all(|b| b.is_ascii_digit())
    };
    let year_ok = parts.last().is_some_and(|y| y.len() == 4 && valid(y, 4));
    if !year_ok {
        return None;
    }
    let year: i32 = parts.last()?.parse().ok()?;
    match parts.as_slice() {
        [month, _] if valid(month, 2) => {
            Some(FhirDate::from_year_month(year, month.parse().ok()?))
        }
        [day, month, _] if valid(day, 2) && valid(month, 2) => Some(FhirDate::from_ymd(
            year,
            month.parse().ok()?,
            day.parse().ok()?,
        )),
        _ => None,
    }
}

impl fmt::Display for FhirDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
            if let Some(day) = self.day {
                write!(f, "-{:02}", day)?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for FhirDate {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FhirDate::parse(s)
    }
}

impl serde::Serialize for FhirDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for FhirDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FhirDate::parse(&s).map_err(serde::de::Error::custom)
    }
}

const NAIVE_DATE_TIME_PATTERNS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Parses an instant from RFC 3339, an ISO local date-time or `dd.MM.yyyy HH:mm[:ss]`.
///
/// Values without an offset are taken as UTC.
///
/// # Errors
///
/// Returns [`FhirError::InvalidTemporal`] naming the input when nothing matches.
pub fn parse_date_time(text: &str) -> FhirResult<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_DATE_TIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(trimmed, pattern).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            FhirError::InvalidTemporal(format!(
                "'{text}' is neither an ISO-8601 date-time nor dd.MM.yyyy HH:mm"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_precisions() {
        assert_eq!(FhirDate::parse("1975").unwrap().precision(), DatePrecision::Year);
        assert_eq!(
            FhirDate::parse("1975-10").unwrap().precision(),
            DatePrecision::Month
        );
        assert_eq!(
            FhirDate::parse("1975-10-10").unwrap().precision(),
            DatePrecision::Day
        );
    }

    #[test]
    fn parses_localized_forms() {
        assert_eq!(FhirDate::parse("10.10.1975").unwrap().to_string(), "1975-10-10");
        assert_eq!(FhirDate::parse("1.2.1975").unwrap().to_string(), "1975-02-01");
        assert_eq!(FhirDate::parse("03.1975").unwrap().to_string(), "1975-03");
    }

    #[test]
    fn truncation_keeps_year_and_month_only() {
        let day = FhirDate::parse("1975-10-10").unwrap();
        let month = FhirDate::parse("1975-10").unwrap();
        let year = FhirDate::parse("1975").unwrap();

        assert_eq!(day.truncate_to_month().to_string(), "1975-10");
        assert_eq!(month.truncate_to_month().to_string(), "1975-10");
        assert_eq!(year.truncate_to_month().to_string(), "1975");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(FhirDate::parse("1975-02-30").is_err());
        assert!(FhirDate::parse("31.02.2000").is_err());
        assert!(FhirDate::parse("1975-13").is_err());
    }

    #[test]
    fn error_names_the_input() {
        let err = FhirDate::parse("next tuesday").expect_err("should reject");
        match err {
            FhirError::InvalidTemporal(msg) => assert!(msg.contains("next tuesday")),
            other => panic!("expected InvalidTemporal error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_digit_groups() {
        assert!(FhirDate::parse("75-10-10").is_err());
        assert!(FhirDate::parse("1975-1-10").is_err());
        assert!(FhirDate::parse("10.10.75").is_err());
        assert!(FhirDate::parse("").is_err());
    }

    #[test]
    fn serde_uses_iso_text() {
        let date = FhirDate::parse("10.10.1975").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"1975-10-10\"");
        let back: FhirDate = serde_json::from_str("\"1975-10\"").unwrap();
        assert_eq!(back, FhirDate::from_year_month(1975, 10).unwrap());
    }

    #[test]
    fn parses_date_times() {
        let rfc = parse_date_time("2024-03-01T10:00:00+01:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-03-01T09:00:00+00:00");

        let local = parse_date_time("2024-03-01T10:00:00").unwrap();
        assert_eq!(local.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let german = parse_date_time("01.03.2024 10:15").unwrap();
        assert_eq!(german.to_rfc3339(), "2024-03-01T10:15:00+00:00");
    }

    #[test]
    fn date_time_error_names_the_input() {
        match parse_date_time("01/03/2024") {
            Err(FhirError::InvalidTemporal(msg)) => assert!(msg.contains("01/03/2024")),
            other => panic!("expected InvalidTemporal error, got {other:?}"),
        }
    }
}
