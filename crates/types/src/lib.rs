//! Validated value types for visit input.
//!
//! Everything the visit form sends arrives as a free string. The types in this crate parse those
//! strings once, at the edge, so that prompt construction and record storage can rely on
//! well-formed values:
//!
//! - [`RequiredText`] for mandatory free-text fields (patient name, diagnosis)
//! - [`VisitDate`] for the visit date, with the Japanese weekday rendering used on forms
//! - [`ClockTime`] and [`VisitWindow`] for the visit start/end times
//! - [`NurseNames`] for the list of attending nurses

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use std::fmt;
use std::str::FromStr;

/// Errors raised while validating visit input values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// A required field was empty or whitespace only.
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    /// The date was not in `YYYY-MM-DD` form or does not exist.
    #[error("invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),
    /// The time was not in `HH:MM` form.
    #[error("invalid time format: {0}. Expected HH:MM")]
    InvalidTime(String),
}

/// A trimmed, non-empty string for a named required field.
///
/// The field name is only used to build the error message; it is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredText(String);

impl RequiredText {
    /// Trims `input` and rejects it if nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::Empty`] carrying `field` when the trimmed input is empty.
    pub fn new(field: &'static str, input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::Empty(field));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequiredText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Calendar date of a home visit.
///
/// Parsed from and displayed as `YYYY-MM-DD`. Forms show it as `2024/01/15（月）`, see
/// [`VisitDate::format_ja`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisitDate(NaiveDate);

impl VisitDate {
    /// Parses a `YYYY-MM-DD` date, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidDate`] when the input is not a real calendar date in that form.
    pub fn parse(input: &str) -> Result<Self, TypesError> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| TypesError::InvalidDate(input.to_owned()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Single-character Japanese weekday (`月` … `日`).
    pub fn weekday_ja(&self) -> &'static str {
        match self.0.weekday() {
            Weekday::Mon => "月",
            Weekday::Tue => "火",
            Weekday::Wed => "水",
            Weekday::Thu => "木",
            Weekday::Fri => "金",
            Weekday::Sat => "土",
            Weekday::Sun => "日",
        }
    }

    /// Formats the date as `YYYY/MM/DD（曜）`, e.g. `2024/01/15（月）`.
    pub fn format_ja(&self) -> String {
        format!("{}（{}）", self.0.format("%Y/%m/%d"), self.weekday_ja())
    }
}

impl fmt::Display for VisitDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for VisitDate {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for VisitDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for VisitDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        VisitDate::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Wall-clock time of day, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parses `HH:MM`. Browsers occasionally submit `HH:MM:SS`; the seconds are accepted and
    /// dropped from the display form.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidTime`] for anything else.
    pub fn parse(input: &str) -> Result<Self, TypesError> {
        let trimmed = input.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self)
            .map_err(|_| TypesError::InvalidTime(input.to_owned()))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Start and end of a visit.
///
/// No ordering is enforced between the two: night visits may cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitWindow {
    start: ClockTime,
    end: ClockTime,
}

impl VisitWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Formats the window as `HH:MM〜HH:MM`.
    pub fn format_range(&self) -> String {
        format!("{}〜{}", self.start, self.end)
    }
}

/// Names of the nurses attending a visit, in the order given.
///
/// Blank entries are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NurseNames(Vec<String>);

impl NurseNames {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Joins the names with `・` as Japanese forms do (`山田・佐藤`).
    ///
    /// Returns `None` when no nurse was given so callers can pick their own placeholder.
    pub fn joined(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.join("・"))
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for NurseNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|name| name.as_ref().trim().to_owned())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }
}
