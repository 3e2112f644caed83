//! CSV body parsing and header validation
//!
//! Batch files are `|`-delimited. The first line must match the expected
//! 34-column header exactly (names and order); any deviation rejects the
//! whole file before a single row is looked at. This is a stricter, second
//! check than admission performed, which never read the body.

use crate::domain::rejection::{FileRejection, FileRejectionKind};
use std::collections::HashMap;

/// The exact expected header row, in order
pub const EXPECTED_CSV_HEADERS: [&str; 34] = [
    "NHS_NUMBER",
    "PERSON_FORENAME",
    "PERSON_SURNAME",
    "PERSON_DOB",
    "PERSON_GENDER_CODE",
    "PERSON_POSTCODE",
    "DATE_AND_TIME",
    "SITE_CODE",
    "SITE_CODE_TYPE_URI",
    "UNIQUE_ID",
    "UNIQUE_ID_URI",
    "ACTION_FLAG",
    "PERFORMING_PROFESSIONAL_FORENAME",
    "PERFORMING_PROFESSIONAL_SURNAME",
    "RECORDED_DATE",
    "PRIMARY_SOURCE",
    "VACCINATION_PROCEDURE_CODE",
    "VACCINATION_PROCEDURE_TERM",
    "DOSE_SEQUENCE",
    "VACCINE_PRODUCT_CODE",
    "VACCINE_PRODUCT_TERM",
    "VACCINE_MANUFACTURER",
    "BATCH_NUMBER",
    "EXPIRY_DATE",
    "SITE_OF_VACCINATION_CODE",
    "SITE_OF_VACCINATION_TERM",
    "ROUTE_OF_VACCINATION_CODE",
    "ROUTE_OF_VACCINATION_TERM",
    "DOSE_AMOUNT",
    "DOSE_UNIT_CODE",
    "DOSE_UNIT_TERM",
    "INDICATION_CODE",
    "LOCATION_CODE",
    "LOCATION_CODE_TYPE_URI",
];

/// One parsed data row, addressed by column name
#[derive(Debug, Clone)]
pub struct CsvRow<'a> {
    columns: &'a HashMap<String, usize>,
    values: Vec<String>,
}

impl<'a> CsvRow<'a> {
    /// The trimmed value of a column, or `None` when absent or empty
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = *self.columns.get(column)?;
        let value = self.values.get(index)?.trim();
        (!value.is_empty()).then_some(value)
    }

    /// The raw value of a column, empty string when absent
    pub fn raw(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&index| self.values.get(index))
            .map(|v| v.as_str())
            .unwrap_or("")
    }
}

/// A parsed batch file body: validated header plus data rows
#[derive(Debug)]
pub struct CsvBody {
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl CsvBody {
    /// Parse a file body and validate its header row
    ///
    /// # Errors
    ///
    /// Returns an `InvalidHeaders` rejection when the header row does not
    /// match [`EXPECTED_CSV_HEADERS`] exactly.
    pub fn parse(content: &str) -> Result<Self, FileRejection> {
        let mut lines = content.lines();
        let header_line = lines.next().unwrap_or("");
        let headers: Vec<&str> = header_line.trim_end_matches('\r').split('|').collect();

        if headers != EXPECTED_CSV_HEADERS {
            return Err(FileRejection::new(
                FileRejectionKind::InvalidHeaders,
                "File headers are invalid.",
            ));
        }

        let columns: HashMap<String, usize> = EXPECTED_CSV_HEADERS
            .iter()
            .enumerate()
            .map(|(index, name)| (name.to_string(), index))
            .collect();

        let rows = lines
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.trim_end_matches('\r')
                    .split('|')
                    .map(|v| v.to_string())
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Number of data rows (header excluded)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the data rows in file order
    pub fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.rows.iter().map(|values| CsvRow {
            columns: &self.columns,
            values: values.clone(),
        })
    }
}

/// Render the canonical header line (test data helper)
pub fn expected_header_line() -> String {
    EXPECTED_CSV_HEADERS.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with(rows: &[&str]) -> String {
        let mut content = expected_header_line();
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    fn data_row(action_flag: &str, unique_id: &str) -> String {
        let mut values = vec![""; EXPECTED_CSV_HEADERS.len()];
        values[0] = "9990548609";
        values[9] = unique_id;
        values[10] = "https://supplier/ids";
        values[11] = action_flag;
        values.join("|")
    }

    #[test]
    fn test_exact_headers_accepted() {
        let body = CsvBody::parse(&body_with(&[&data_row("NEW", "0001")])).unwrap();
        assert_eq!(body.row_count(), 1);
    }

    #[test]
    fn test_missing_column_rejects_file() {
        let truncated = EXPECTED_CSV_HEADERS[..33].join("|");
        let rejection = CsvBody::parse(&truncated).unwrap_err();
        assert_eq!(rejection.kind, FileRejectionKind::InvalidHeaders);
    }

    #[test]
    fn test_reordered_columns_reject_file() {
        let mut headers: Vec<&str> = EXPECTED_CSV_HEADERS.to_vec();
        headers.swap(0, 1);
        let rejection = CsvBody::parse(&headers.join("|")).unwrap_err();
        assert_eq!(rejection.kind, FileRejectionKind::InvalidHeaders);
    }

    #[test]
    fn test_lower_case_headers_reject_file() {
        let lowered = expected_header_line().to_lowercase();
        assert!(CsvBody::parse(&lowered).is_err());
    }

    #[test]
    fn test_crlf_line_endings_accepted() {
        let content = format!("{}\r\n{}\r\n", expected_header_line(), data_row("NEW", "0001"));
        let body = CsvBody::parse(&content).unwrap();
        assert_eq!(body.row_count(), 1);
        let row = body.rows().next().unwrap();
        assert_eq!(row.get("ACTION_FLAG"), Some("NEW"));
    }

    #[test]
    fn test_row_access_by_column_name() {
        let body = CsvBody::parse(&body_with(&[&data_row("update", "0002")])).unwrap();
        let row = body.rows().next().unwrap();
        assert_eq!(row.get("NHS_NUMBER"), Some("9990548609"));
        assert_eq!(row.get("UNIQUE_ID"), Some("0002"));
        assert_eq!(row.get("PERSON_FORENAME"), None);
        assert_eq!(row.raw("ACTION_FLAG"), "update");
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let content = format!("{}\n{}\n\n\n", expected_header_line(), data_row("NEW", "1"));
        assert_eq!(CsvBody::parse(&content).unwrap().row_count(), 1);
    }
}
