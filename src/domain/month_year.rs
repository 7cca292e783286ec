use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A calendar month. Only the month and the year are significant, the
/// underlying date is always the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear(NaiveDate);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("{0:?} is not a valid month-year value, expected MM-YYYY")]
pub struct FormatError(String);

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Result<MonthYear, FormatError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| FormatError(format!("{:02}-{:04}", month, year)))
    }

    /// Parses the exact `MM-YYYY` wire format: a zero-padded month in 01..=12,
    /// a dash and a four digit year.
    pub fn parse(value: &str) -> Result<MonthYear, FormatError> {
        let invalid = || FormatError(value.to_string());
        let bytes = value.as_bytes();

        if bytes.len() != 7 || bytes[2] != b'-' {
            return Err(invalid());
        }

        let (month, year) = (&value[..2], &value[3..]);

        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Self::new(month, year).map_err(|_| invalid())
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }
}

// Dates read back from storage are truncated to their month
impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;

        MonthYear::parse(&value).map_err(serde::de::Error::custom)
    }
}
