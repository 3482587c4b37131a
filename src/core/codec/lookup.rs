//! Code-lookup formatters
//!
//! Every lookup resolves in the same order: an exact code is passed through,
//! otherwise the text is matched case-insensitively against a small
//! vocabulary, otherwise the slot is filled with blanks. None of them fail.

use super::fields::{digits_of, format_numeric, pad_left, pad_right, repeat_char};
use crate::domain::FieldValue;

/// Race code for "indigenous"; the only race that carries an ethnicity
pub const INDIGENOUS_RACE: &str = "05";

/// Literal written when the address has no house number
pub const NO_NUMBER: &str = "SN";

const RACE_CODES: [u32; 6] = [1, 2, 3, 4, 5, 99];

const RACE_VOCABULARY: [(&str, &str); 8] = [
    ("branc", "01"),
    ("pret", "02"),
    ("pard", "03"),
    ("amarel", "04"),
    ("ind", "05"),
    ("sem inf", "99"),
    ("não inf", "99"),
    ("nao inf", "99"),
];

const STREET_TYPE_VOCABULARY: [(&str, &str); 6] = [
    ("rua", "001"),
    ("avenida", "002"),
    ("av", "002"),
    ("praça", "003"),
    ("praca", "003"),
    ("pç", "003"),
];

const NO_NUMBER_SPELLINGS: [&str; 5] = ["sn", "s/n", "s.n.", "s/nº", "sem numero"];

fn normalized(value: &FieldValue) -> String {
    value.to_plain_string().trim().to_lowercase()
}

/// Value whose text is a bare number, as that number
fn exact_code(value: &FieldValue) -> Option<u32> {
    match value {
        FieldValue::Integer(i) => u32::try_from(*i).ok(),
        FieldValue::Text(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Two-digit race code
///
/// ```
/// use bpa_export::core::codec::lookup::race_code;
///
/// assert_eq!(race_code(&"3".into()), "03");
/// assert_eq!(race_code(&"Parda".into()), "03");
/// assert_eq!(race_code(&"unknown-word".into()), "  ");
/// ```
pub fn race_code(value: &FieldValue) -> String {
    if let Some(code) = exact_code(value) {
        if RACE_CODES.contains(&code) {
            return format!("{code:02}");
        }
        return repeat_char(' ', 2);
    }
    let text = normalized(value);
    if text.is_empty() {
        return repeat_char(' ', 2);
    }
    RACE_VOCABULARY
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| repeat_char(' ', 2))
}

/// Four-digit ethnicity code, blank unless the race is indigenous
pub fn ethnicity_code(value: &FieldValue, race: &str) -> String {
    if race != INDIGENOUS_RACE || value.is_absent() {
        return repeat_char(' ', 4);
    }
    format_numeric(value, 4)
}

/// One-character sex flag (`M`, `F` or blank)
pub fn sex_flag(value: &FieldValue) -> &'static str {
    let text = normalized(value);
    match text.as_str() {
        "m" => "M",
        "f" => "F",
        t if t.starts_with("masc") => "M",
        t if t.starts_with("fem") => "F",
        _ => " ",
    }
}

/// Three-digit street-type code
///
/// An explicit numeric code wins; otherwise the street-type text and then the
/// street address itself are matched against the vocabulary by prefix.
pub fn street_type_code(street_type: &FieldValue, address: &FieldValue) -> String {
    if exact_code(street_type).is_some() {
        return pad_left(&digits_of(street_type), 3, '0');
    }
    [street_type, address]
        .into_iter()
        .map(normalized)
        .find_map(|text| {
            STREET_TYPE_VOCABULARY
                .iter()
                .find(|(needle, _)| {
                    text.strip_prefix(needle).is_some_and(|rest| {
                        rest.is_empty() || rest.starts_with(&[' ', '.'][..])
                    })
                })
                .map(|(_, code)| code.to_string())
        })
        .unwrap_or_else(|| repeat_char(' ', 3))
}

/// Five-character house number, [`NO_NUMBER`] when there is none
pub fn street_number(value: &FieldValue) -> String {
    let text = value.to_plain_string();
    let text = text.trim();
    if text.is_empty() || NO_NUMBER_SPELLINGS.contains(&text.to_lowercase().as_str()) {
        return pad_right(NO_NUMBER, 5, ' ');
    }
    pad_right(text, 5, ' ')
}

/// Four-character diagnosis code without the dot, upper-cased
pub fn diagnosis_code(value: &FieldValue) -> String {
    let cleaned: String = value
        .to_plain_string()
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .flat_map(char::to_uppercase)
        .collect();
    pad_right(&cleaned, 4, ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1", "01" ; "numeric branca")]
    #[test_case("03", "03" ; "padded numeric")]
    #[test_case("99", "99" ; "no information code")]
    #[test_case("7", "  " ; "numeric outside table")]
    #[test_case("pardo", "03" ; "pardo")]
    #[test_case("PARDA", "03" ; "upper case")]
    #[test_case("Branca", "01" ; "branca")]
    #[test_case("preta", "02" ; "preta")]
    #[test_case("Amarela", "04" ; "amarela")]
    #[test_case("Indígena", "05" ; "indigena")]
    #[test_case("Sem informação", "99" ; "sem informacao")]
    #[test_case("unknown-word", "  " ; "blank sentinel")]
    #[test_case("", "  " ; "empty")]
    fn test_race_code(input: &str, expected: &str) {
        assert_eq!(race_code(&input.into()), expected);
    }

    #[test]
    fn test_race_code_integer_and_null() {
        assert_eq!(race_code(&FieldValue::Integer(5)), "05");
        assert_eq!(race_code(&FieldValue::Null), "  ");
    }

    #[test]
    fn test_ethnicity_only_for_indigenous() {
        assert_eq!(ethnicity_code(&"12".into(), "05"), "0012");
        assert_eq!(ethnicity_code(&"12".into(), "03"), "    ");
        assert_eq!(ethnicity_code(&FieldValue::Null, "05"), "    ");
    }

    #[test_case("M", "M" ; "upper m")]
    #[test_case("f", "F" ; "lower f")]
    #[test_case("Masculino", "M" ; "masculino")]
    #[test_case("FEMININO", "F" ; "feminino")]
    #[test_case("X", " " ; "unknown letter")]
    #[test_case("", " " ; "empty sex")]
    fn test_sex_flag(input: &str, expected: &str) {
        assert_eq!(sex_flag(&input.into()), expected);
    }

    #[test_case("81", "", "081" ; "explicit code")]
    #[test_case("", "Rua das Flores", "001" ; "rua from address")]
    #[test_case("", "AV. Brasil", "002" ; "av abbreviation")]
    #[test_case("Avenida", "", "002" ; "avenida type text")]
    #[test_case("", "Praça da Sé", "003" ; "praca accented")]
    #[test_case("", "Travessa Um", "   " ; "unknown type")]
    #[test_case("", "Ruanda 12", "   " ; "prefix must be a whole word")]
    fn test_street_type_code(kind: &str, address: &str, expected: &str) {
        assert_eq!(street_type_code(&kind.into(), &address.into()), expected);
    }

    #[test_case("", "SN   " ; "empty number")]
    #[test_case("s/n", "SN   " ; "spelled no number")]
    #[test_case("123", "123  " ; "short number")]
    #[test_case("1234567", "12345" ; "long number truncated")]
    fn test_street_number(input: &str, expected: &str) {
        assert_eq!(street_number(&input.into()), expected);
    }

    #[test]
    fn test_diagnosis_code() {
        assert_eq!(diagnosis_code(&"j45.9".into()), "J459");
        assert_eq!(diagnosis_code(&"Z00".into()), "Z00 ");
        assert_eq!(diagnosis_code(&FieldValue::Null), "    ");
    }
}
