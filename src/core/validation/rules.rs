//! Shape predicates for identifiers and dates
//!
//! These check digit counts and calendar validity only; check digits are not
//! verified.

use chrono::NaiveDate;

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Facility code: 7 digits once punctuation is removed
pub fn is_valid_cnes(value: &str) -> bool {
    digits(value).len() == 7
}

/// Tax ID: 14 digits, not a single repeated digit
pub fn is_valid_cnpj(value: &str) -> bool {
    let digits = digits(value);
    digits.len() == 14 && digits.bytes().any(|b| b != digits.as_bytes()[0])
}

/// Health-card number: 15 digits
pub fn is_valid_cns(value: &str) -> bool {
    digits(value).len() == 15
}

/// Occupation code: 6 alphanumeric characters
pub fn is_valid_cbo(value: &str) -> bool {
    value.chars().filter(|c| c.is_alphanumeric()).count() == 6
}

/// Procedure code: 10 digits
pub fn is_valid_procedure(value: &str) -> bool {
    digits(value).len() == 10
}

/// `YYYYMMDD` between 1900 and 2100 naming a real calendar day
///
/// ```
/// use bpa_export::core::validation::rules::is_valid_date_field;
///
/// assert!(is_valid_date_field("20240229"));
/// assert!(!is_valid_date_field("20230229"));
/// assert!(!is_valid_date_field("2024-02-29"));
/// ```
pub fn is_valid_date_field(value: &str) -> bool {
    if value.len() != 8 || !value.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match NaiveDate::parse_from_str(value, "%Y%m%d") {
        Ok(date) => (1900..=2100).contains(&chrono::Datelike::year(&date)),
        Err(_) => false,
    }
}

/// `YYYYMM` with year 1990..=2100 and month 1..=12
pub fn is_valid_competency(value: &str) -> bool {
    value.parse::<crate::domain::Competency>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2560372", true ; "seven digits")]
    #[test_case("256.037-2", true ; "punctuated")]
    #[test_case("256037", false ; "too short")]
    fn test_cnes(value: &str, expected: bool) {
        assert_eq!(is_valid_cnes(value), expected);
    }

    #[test_case("25.062.282/0001-82", true ; "punctuated")]
    #[test_case("00000000000000", false ; "repeated digit")]
    #[test_case("2506228200018", false ; "thirteen digits")]
    fn test_cnpj(value: &str, expected: bool) {
        assert_eq!(is_valid_cnpj(value), expected);
    }

    #[test]
    fn test_cns_cbo_procedure() {
        assert!(is_valid_cns("898 0012 3456 7890"));
        assert!(!is_valid_cns("89800123456789"));
        assert!(is_valid_cbo("2251-25"));
        assert!(is_valid_cbo("CBO123"));
        assert!(!is_valid_cbo("22512"));
        assert!(is_valid_procedure("03.01.01.006-4"));
        assert!(!is_valid_procedure("030101006"));
    }

    #[test_case("20240115", true ; "ordinary day")]
    #[test_case("20000229", true ; "leap century")]
    #[test_case("19000229", false ; "non leap century")]
    #[test_case("18991231", false ; "before range")]
    #[test_case("20241301", false ; "month thirteen")]
    #[test_case("2024011", false ; "seven chars")]
    #[test_case("00000000", false ; "zero date")]
    fn test_date_field(value: &str, expected: bool) {
        assert_eq!(is_valid_date_field(value), expected);
    }

    #[test]
    fn test_competency() {
        assert!(is_valid_competency("202401"));
        assert!(!is_valid_competency("198912"));
        assert!(!is_valid_competency("20241"));
    }
}
