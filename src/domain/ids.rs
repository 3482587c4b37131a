//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers the export layout carries. Each type
//! checks its digit-count constraint on construction so that an invalid value
//! cannot reach the codec.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portuguese three-letter month abbreviations used in output file names
const MONTH_ABBREV: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

/// Competency period (`YYYYMM`) a batch of clinical activity is attributed to
///
/// # Examples
///
/// ```
/// use bpa_export::domain::ids::Competency;
/// use std::str::FromStr;
///
/// let competency = Competency::from_str("202401").unwrap();
/// assert_eq!(competency.year(), 2024);
/// assert_eq!(competency.month(), 1);
/// assert_eq!(competency.month_abbrev(), "JAN");
/// assert_eq!(competency.to_string(), "202401");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Competency {
    year: u16,
    month: u8,
}

impl Competency {
    /// Creates a competency from its year and month
    pub fn new(year: u16, month: u8) -> Result<Self, String> {
        if !(1990..=2100).contains(&year) {
            return Err(format!("Competency year must be between 1990 and 2100, got {year}"));
        }
        if !(1..=12).contains(&month) {
            return Err(format!("Competency month must be between 1 and 12, got {month}"));
        }
        Ok(Self { year, month })
    }

    /// Returns the year component
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Returns the month component (1-12)
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Three-letter month abbreviation (`JAN`, `FEV`, ..., `DEZ`)
    pub fn month_abbrev(&self) -> &'static str {
        MONTH_ABBREV[usize::from(self.month - 1)]
    }

    /// First calendar day of the period
    pub fn first_day(&self) -> NaiveDate {
        // Year and month were range-checked on construction.
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the period
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (i32::from(self.year) + 1, 1)
        } else {
            (i32::from(self.year), u32::from(self.month) + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == i32::from(self.year) && date.month() == u32::from(self.month)
    }
}

impl fmt::Display for Competency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for Competency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Competency must be in YYYYMM format, got '{s}'"));
        }
        let year: u16 = s[0..4]
            .parse()
            .map_err(|_| format!("Invalid competency year in '{s}'"))?;
        let month: u8 = s[4..6]
            .parse()
            .map_err(|_| format!("Invalid competency month in '{s}'"))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Competency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<Competency> for String {
    fn from(value: Competency) -> Self {
        value.to_string()
    }
}

/// Facility code (CNES): exactly 7 digits
///
/// # Examples
///
/// ```
/// use bpa_export::domain::ids::Cnes;
///
/// assert!(Cnes::new("2560372").is_ok());
/// assert!(Cnes::new("256037").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cnes(String);

impl Cnes {
    /// Creates a new Cnes, rejecting anything that is not 7 digits
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        let code = code.trim();
        if code.len() != 7 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("CNES must have exactly 7 digits, got '{code}'"));
        }
        Ok(Self(code.to_string()))
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cnes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cnes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Cnes {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Entity tax ID (CNPJ): 14 digits, punctuation allowed on input
///
/// A value made of one repeated digit is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cnpj(String);

impl Cnpj {
    /// Creates a new Cnpj from a possibly punctuated value (`25.062.282/0001-82`)
    pub fn new(value: impl AsRef<str>) -> Result<Self, String> {
        let digits: String = value
            .as_ref()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.len() != 14 {
            return Err(format!(
                "CNPJ must have exactly 14 digits, got {} in '{}'",
                digits.len(),
                value.as_ref()
            ));
        }
        let first = digits.as_bytes()[0];
        if digits.bytes().all(|b| b == first) {
            return Err(format!("CNPJ cannot repeat a single digit: '{digits}'"));
        }
        Ok(Self(digits))
    }

    /// Returns the 14 digits
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cnpj {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_competency_parse_and_display() {
        let c = Competency::from_str("202401").unwrap();
        assert_eq!(c.year(), 2024);
        assert_eq!(c.month(), 1);
        assert_eq!(c.to_string(), "202401");
    }

    #[test]
    fn test_competency_rejects_bad_input() {
        assert!(Competency::from_str("2024-01").is_err());
        assert!(Competency::from_str("202413").is_err());
        assert!(Competency::from_str("202400").is_err());
        assert!(Competency::from_str("198912").is_err());
        assert!(Competency::from_str("").is_err());
    }

    #[test]
    fn test_competency_month_bounds() {
        let feb = Competency::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = Competency::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(dec.month_abbrev(), "DEZ");
    }

    #[test]
    fn test_competency_contains() {
        let c = Competency::new(2024, 3).unwrap();
        assert!(c.contains(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert!(!c.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_competency_serde_as_string() {
        let c = Competency::new(2024, 5).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"202405\"");
        let back: Competency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_cnes_validation() {
        assert!(Cnes::new("2560372").is_ok());
        assert!(Cnes::new("25603721").is_err());
        assert!(Cnes::new("25603A2").is_err());
    }

    #[test]
    fn test_cnpj_validation() {
        let cnpj = Cnpj::new("25.062.282/0001-82").unwrap();
        assert_eq!(cnpj.as_str(), "25062282000182");
        assert!(Cnpj::new("1234567890123").is_err());
        assert!(Cnpj::new("11111111111111").is_err());
    }
}
