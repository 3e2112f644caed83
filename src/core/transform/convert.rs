//! Deterministic field conversions
//!
//! Column values are normalized into canonical forms where the input matches
//! the supplier file conventions; anything else is reported as a conversion
//! failure so the row can carry a diagnostic instead of silently storing
//! malformed data.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// A single failed field conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    /// Source column name
    pub column: &'static str,
    /// What was wrong with the value
    pub reason: String,
}

impl ConversionError {
    fn new(column: &'static str, reason: impl Into<String>) -> Self {
        Self {
            column,
            reason: reason.into(),
        }
    }
}

/// Convert `YYYYMMDDThhmmss`, `...00` (UTC) or `...01` (BST) to RFC 3339
///
/// A missing timezone suffix defaults to UTC.
pub fn date_time(column: &'static str, value: &str) -> Result<String, ConversionError> {
    let plain = Regex::new(r"^\d{8}T\d{6}$").unwrap();
    let utc = Regex::new(r"^\d{8}T\d{6}00$").unwrap();
    let bst = Regex::new(r"^\d{8}T\d{6}01$").unwrap();

    let (stripped, offset) = if utc.is_match(value) {
        (&value[..15], "+00:00")
    } else if bst.is_match(value) {
        (&value[..15], "+01:00")
    } else if plain.is_match(value) {
        (value, "+00:00")
    } else {
        return Err(ConversionError::new(
            column,
            format!("'{value}' is not a datetime in YYYYMMDDThhmmss format"),
        ));
    };

    let parsed = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
        .map_err(|_| ConversionError::new(column, format!("'{value}' is not a valid datetime")))?;
    Ok(format!("{}{}", parsed.format("%Y-%m-%dT%H:%M:%S"), offset))
}

/// Convert `YYYYMMDD` to `YYYY-MM-DD`
pub fn date(column: &'static str, value: &str) -> Result<String, ConversionError> {
    if !Regex::new(r"^\d{8}$").unwrap().is_match(value) {
        return Err(ConversionError::new(
            column,
            format!("'{value}' is not a date in YYYYMMDD format"),
        ));
    }
    let parsed = NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|_| ConversionError::new(column, format!("'{value}' is not a valid date")))?;
    Ok(parsed.format("%Y-%m-%d").to_string())
}

/// Convert the numeric gender code to its canonical term
///
/// 1 → male, 2 → female, 9 → other, 0 → unknown.
pub fn gender_code(column: &'static str, value: &str) -> Result<String, ConversionError> {
    match value {
        "1" => Ok("male".to_string()),
        "2" => Ok("female".to_string()),
        "9" => Ok("other".to_string()),
        "0" => Ok("unknown".to_string()),
        other => Err(ConversionError::new(
            column,
            format!("'{other}' is not a recognised gender code"),
        )),
    }
}

/// Convert a textual boolean, case-insensitively
pub fn boolean(column: &'static str, value: &str) -> Result<bool, ConversionError> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ConversionError::new(
            column,
            format!("'{other}' is not a boolean"),
        )),
    }
}

/// Convert a dose amount to a number
pub fn dose_amount(column: &'static str, value: &str) -> Result<f64, ConversionError> {
    value
        .parse::<f64>()
        .map_err(|_| ConversionError::new(column, format!("'{value}' is not a number")))
}

/// Convert a dose sequence to a positive integer
pub fn dose_sequence(column: &'static str, value: &str) -> Result<u32, ConversionError> {
    value
        .parse::<u32>()
        .map_err(|_| ConversionError::new(column, format!("'{value}' is not an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("20240101T120000", "2024-01-01T12:00:00+00:00" ; "no timezone defaults to utc")]
    #[test_case("20240101T12000000", "2024-01-01T12:00:00+00:00" ; "utc suffix")]
    #[test_case("20240601T09300001", "2024-06-01T09:30:00+01:00" ; "bst suffix")]
    fn test_date_time_conversion(input: &str, expected: &str) {
        assert_eq!(date_time("DATE_AND_TIME", input).unwrap(), expected);
    }

    #[test_case("2024-01-01T12:00:00" ; "already formatted")]
    #[test_case("20241301T120000" ; "invalid month")]
    #[test_case("20240101" ; "date only")]
    #[test_case("20240101T12000099" ; "unknown timezone suffix")]
    fn test_date_time_rejects(input: &str) {
        assert!(date_time("DATE_AND_TIME", input).is_err());
    }

    #[test]
    fn test_date_conversion() {
        assert_eq!(date("PERSON_DOB", "19560720").unwrap(), "1956-07-20");
        assert!(date("PERSON_DOB", "1956-07-20").is_err());
        assert!(date("PERSON_DOB", "19561350").is_err());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(gender_code("PERSON_GENDER_CODE", "1").unwrap(), "male");
        assert_eq!(gender_code("PERSON_GENDER_CODE", "2").unwrap(), "female");
        assert_eq!(gender_code("PERSON_GENDER_CODE", "9").unwrap(), "other");
        assert_eq!(gender_code("PERSON_GENDER_CODE", "0").unwrap(), "unknown");
        assert!(gender_code("PERSON_GENDER_CODE", "3").is_err());
    }

    #[test]
    fn test_boolean_is_case_insensitive() {
        assert!(boolean("PRIMARY_SOURCE", "TRUE").unwrap());
        assert!(!boolean("PRIMARY_SOURCE", "False").unwrap());
        assert!(boolean("PRIMARY_SOURCE", "yes").is_err());
    }

    #[test]
    fn test_dose_amount() {
        assert_eq!(dose_amount("DOSE_AMOUNT", "0.5").unwrap(), 0.5);
        assert_eq!(dose_amount("DOSE_AMOUNT", "1").unwrap(), 1.0);
        assert!(dose_amount("DOSE_AMOUNT", "half").is_err());
    }

    #[test]
    fn test_conversion_error_names_column() {
        let err = date("EXPIRY_DATE", "soon").unwrap_err();
        assert_eq!(err.column, "EXPIRY_DATE");
        assert!(err.reason.contains("soon"));
    }
}
