//! File key parsing and validation
//!
//! Incoming data files are named
//! `{VACCINE_TYPE}_VACCINATIONS_{VERSION}_{ODS_CODE}_{TIMESTAMP}.{csv|dat}`,
//! case-insensitive, with exactly four underscores and a single dot after the
//! fourth underscore. Any deviation, including an ODS code that cannot be
//! resolved to a supplier, rejects the file with `InvalidFileKey`.

use crate::domain::ids::QueueName;
use crate::domain::rejection::{FileRejection, FileRejectionKind};
use crate::domain::vaccine::VaccineType;
use chrono::NaiveDateTime;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// File key versions currently accepted
const VALID_VERSIONS: &[&str] = &["V5"];

/// Supported file extensions
///
/// DAT is accepted for files arriving via mailbox transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileExtension {
    Csv,
    Dat,
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileExtension::Csv => write!(f, "CSV"),
            FileExtension::Dat => write!(f, "DAT"),
        }
    }
}

/// Resolves a supplier name from an ODS code
///
/// Any ODS code not present in this mapping is invalid for this service.
pub fn supplier_for_ods_code(ods_code: &str) -> Option<&'static str> {
    match ods_code {
        "YGM41" => Some("EMIS"),
        "8J1100001" => Some("PINNACLE"),
        "8HK48" => Some("SONAR"),
        "YGA" => Some("TPP"),
        "0DE" => Some("AGEM-NIVS"),
        "0DF" => Some("NIMS"),
        "8HA94" => Some("EVA"),
        "X26" => Some("RAVS"),
        "YGMYH" => Some("MEDICAL_DIRECTOR"),
        "W00" => Some("WELSH_DA_1"),
        "W000" => Some("WELSH_DA_2"),
        "ZT001" => Some("NORTHERN_IRELAND_DA"),
        "YA7" => Some("SCOTLAND_DA"),
        "N2N9I" => Some("COVID19_VACCINE_RESOLUTION_SERVICEDESK"),
        "YGJ" => Some("EMIS"),
        "DPSREDUCED" => Some("DPSREDUCED"),
        "DPSFULL" => Some("DPSFULL"),
        _ => None,
    }
}

/// A validated, admitted file key
///
/// Immutable once constructed. All segments are normalized to upper case, so
/// parsing is deterministic regardless of the case of the input key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey {
    raw: String,
    vaccine_type: VaccineType,
    version: String,
    ods_code: String,
    supplier: String,
    timestamp: String,
    extension: FileExtension,
}

impl FileKey {
    /// Parse and validate a file key
    ///
    /// # Errors
    ///
    /// Returns an `InvalidFileKey` rejection if the key does not match the
    /// naming convention or any segment fails validation.
    pub fn parse(key: &str) -> Result<Self, FileRejection> {
        let pattern = Regex::new(r"^[^_.]*_[^_.]*_[^_.]*_[^_.]*_[^_.]*\.[^_.]*$").unwrap();
        if !pattern.is_match(key) {
            return Err(FileRejection::new(
                FileRejectionKind::InvalidFileKey,
                "Initial file validation failed: invalid file key format",
            ));
        }

        let upper = key.to_uppercase();
        let (stem, extension) = match upper.split_once('.') {
            Some(parts) => parts,
            None => {
                return Err(FileRejection::new(
                    FileRejectionKind::InvalidFileKey,
                    "Initial file validation failed: invalid file key format",
                ))
            }
        };
        let segments: Vec<&str> = stem.split('_').collect();

        let invalid =
            || FileRejection::new(FileRejectionKind::InvalidFileKey, "Initial file validation failed: invalid file key");

        let vaccine_type = VaccineType::from_str(segments[0]).map_err(|_| invalid())?;

        if segments[1] != "VACCINATIONS" {
            return Err(invalid());
        }

        let version = segments[2];
        if !VALID_VERSIONS.contains(&version) {
            return Err(invalid());
        }

        let ods_code = segments[3];
        let supplier = supplier_for_ods_code(ods_code).ok_or_else(invalid)?;

        let timestamp = segments[4];
        if !is_valid_timestamp(timestamp) {
            return Err(invalid());
        }

        let extension = match extension {
            "CSV" => FileExtension::Csv,
            "DAT" => FileExtension::Dat,
            _ => return Err(invalid()),
        };

        Ok(Self {
            raw: key.to_string(),
            vaccine_type,
            version: version.to_string(),
            ods_code: ods_code.to_string(),
            supplier: supplier.to_string(),
            timestamp: timestamp.to_string(),
            extension,
        })
    }

    /// The file key exactly as submitted
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Vaccine type encoded in the key
    pub fn vaccine_type(&self) -> VaccineType {
        self.vaccine_type
    }

    /// Version segment (upper case)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// ODS code segment (upper case)
    pub fn ods_code(&self) -> &str {
        &self.ods_code
    }

    /// Supplier resolved from the ODS code
    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    /// Timestamp segment (upper case, not further normalized)
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// File extension
    pub fn extension(&self) -> FileExtension {
        self.extension
    }

    /// Queue this file is serialized on: `{supplier}_{vaccine_type}`
    pub fn queue_name(&self) -> QueueName {
        QueueName::new(&self.supplier, self.vaccine_type.as_str())
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Checks the timestamp is at least a valid 15-character `YYYYMMDDTHHMMSS`
///
/// Trailing characters (usually timezone digits) are not validated further.
fn is_valid_timestamp(timestamp: &str) -> bool {
    if timestamp.len() < 15 {
        return false;
    }
    NaiveDateTime::parse_from_str(&timestamp[..15], "%Y%m%dT%H%M%S").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_valid_file_key() {
        let key = FileKey::parse("Flu_Vaccinations_v5_YGM41_20240708T12130100.csv").unwrap();
        assert_eq!(key.vaccine_type(), VaccineType::Flu);
        assert_eq!(key.version(), "V5");
        assert_eq!(key.ods_code(), "YGM41");
        assert_eq!(key.supplier(), "EMIS");
        assert_eq!(key.timestamp(), "20240708T12130100");
        assert_eq!(key.extension(), FileExtension::Csv);
        assert_eq!(key.queue_name().as_str(), "EMIS_FLU");
    }

    #[test]
    fn test_parsing_is_case_insensitive() {
        let lower = FileKey::parse("flu_vaccinations_v5_ygm41_20240101t120000.csv").unwrap();
        let upper = FileKey::parse("FLU_VACCINATIONS_V5_YGM41_20240101T120000.CSV").unwrap();
        assert_eq!(lower.vaccine_type(), upper.vaccine_type());
        assert_eq!(lower.supplier(), upper.supplier());
        assert_eq!(lower.timestamp(), upper.timestamp());
        assert_eq!(lower.queue_name(), upper.queue_name());
    }

    #[test_case("Flu_Vaccinations_v5_YGM41_20240708T12130100" ; "missing extension")]
    #[test_case("Flu_Vaccinations_v5_YGM41.csv" ; "too few segments")]
    #[test_case("Flu_Vaccinations_v5_YGM41_2024_0708T121301.csv" ; "too many underscores")]
    #[test_case("Flu.Vaccinations_v5_YGM41_20240708T12130100.csv" ; "dot before fourth underscore")]
    #[test_case("Polio_Vaccinations_v5_YGM41_20240708T12130100.csv" ; "unknown vaccine type")]
    #[test_case("Flu_Immunisations_v5_YGM41_20240708T12130100.csv" ; "wrong marker segment")]
    #[test_case("Flu_Vaccinations_v4_YGM41_20240708T12130100.csv" ; "unsupported version")]
    #[test_case("Flu_Vaccinations_v5_BADODS_20240708T12130100.csv" ; "unresolvable ods code")]
    #[test_case("Flu_Vaccinations_v5_YGM41_20241708T12130100.csv" ; "invalid month")]
    #[test_case("Flu_Vaccinations_v5_YGM41_20240708.csv" ; "timestamp too short")]
    #[test_case("Flu_Vaccinations_v5_YGM41_20240708T12130100.xlsx" ; "unsupported extension")]
    fn test_invalid_file_keys(key: &str) {
        let rejection = FileKey::parse(key).unwrap_err();
        assert_eq!(rejection.kind, FileRejectionKind::InvalidFileKey);
    }

    #[test]
    fn test_dat_extension_accepted() {
        let key = FileKey::parse("RSV_Vaccinations_V5_X26_20240101T120000.DAT").unwrap();
        assert_eq!(key.extension(), FileExtension::Dat);
        assert_eq!(key.supplier(), "RAVS");
    }

    #[test]
    fn test_timestamp_trailing_characters_not_validated() {
        // Only the first 15 characters need to be a valid datetime
        assert!(FileKey::parse("Flu_Vaccinations_v5_YGM41_20240708T121301XX.csv").is_ok());
    }
}
