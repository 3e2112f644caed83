//! Per-row validation and transformation
//!
//! Each data row passes through four checks in order: action flag, per-row
//! operation permission, unique identifier presence, then field mapping into
//! a canonical record. The first failure attaches a diagnostic; whatever the
//! outcome, the caller dispatches exactly one message for the row.

use crate::core::transform::convert::{self, ConversionError};
use crate::core::transform::headers::CsvRow;
use crate::domain::{
    target_diseases, CanonicalRecord, CodedValue, Diagnostic, DiagnosticKind, LocalId, Operation,
    PatientSubject, RecordIdentifier, RowPayload, VaccinationEvent, VaccineType,
};
use std::collections::HashSet;

/// The result of validating and transforming one row
#[derive(Debug, Clone)]
pub struct ProcessedRow {
    /// Supplier-assigned row identity, reportable even for failed rows
    pub local_id: LocalId,
    /// The requested operation, when the action flag was valid
    pub operation_requested: Option<Operation>,
    /// Canonical record or diagnostic
    pub payload: RowPayload,
}

/// Validate and transform a single row
pub fn process_row(
    vaccine_type: VaccineType,
    allowed_operations: &HashSet<Operation>,
    row: &CsvRow<'_>,
) -> ProcessedRow {
    let unique_id = row.get("UNIQUE_ID").unwrap_or("");
    let unique_id_uri = row.get("UNIQUE_ID_URI").unwrap_or("");
    let local_id = LocalId::new(unique_id, unique_id_uri);

    let action_flag = row.raw("ACTION_FLAG");
    let Some(operation) = Operation::from_action_flag(action_flag) else {
        tracing::info!(
            action_flag = %action_flag,
            "Invalid ACTION_FLAG - ACTION_FLAG must be 'NEW', 'UPDATE' or 'DELETE'"
        );
        return ProcessedRow {
            local_id,
            operation_requested: None,
            payload: RowPayload::Diagnostic(Diagnostic::invalid_action_flag()),
        };
    };

    if !allowed_operations.contains(&operation) {
        tracing::info!(
            operation = %operation,
            "Skipping row as supplier does not have the permissions for this operation"
        );
        return ProcessedRow {
            local_id,
            operation_requested: Some(operation),
            payload: RowPayload::Diagnostic(Diagnostic::no_operation_permission()),
        };
    }

    if unique_id.is_empty() || unique_id_uri.is_empty() {
        tracing::warn!("Invalid row format: row is missing either UNIQUE_ID or UNIQUE_ID_URI");
        return ProcessedRow {
            local_id,
            operation_requested: Some(operation),
            payload: RowPayload::Diagnostic(Diagnostic::missing_unique_id()),
        };
    }

    let payload = match convert_row(vaccine_type, row, unique_id, unique_id_uri) {
        Ok(record) => RowPayload::Record(record),
        Err(diagnostic) => RowPayload::Diagnostic(diagnostic),
    };

    ProcessedRow {
        local_id,
        operation_requested: Some(operation),
        payload,
    }
}

/// Map a row's columns onto a canonical record
///
/// Absent optional values stay absent; present values that fail conversion
/// accumulate into a single `InvalidConversion` diagnostic naming every
/// offending column.
fn convert_row(
    vaccine_type: VaccineType,
    row: &CsvRow<'_>,
    unique_id: &str,
    unique_id_uri: &str,
) -> Result<CanonicalRecord, Diagnostic> {
    let mut errors: Vec<ConversionError> = Vec::new();

    let mut convert_opt = |column: &'static str,
                           f: &dyn Fn(&'static str, &str) -> Result<String, ConversionError>|
     -> Option<String> {
        row.get(column).and_then(|value| match f(column, value) {
            Ok(converted) => Some(converted),
            Err(e) => {
                errors.push(e);
                None
            }
        })
    };

    let date_of_birth = convert_opt("PERSON_DOB", &convert::date);
    let gender = convert_opt("PERSON_GENDER_CODE", &convert::gender_code);
    let occurrence = convert_opt("DATE_AND_TIME", &convert::date_time);
    let recorded = convert_opt("RECORDED_DATE", &convert::date);
    let expiry_date = convert_opt("EXPIRY_DATE", &convert::date);

    let primary_source = row.get("PRIMARY_SOURCE").and_then(|value| {
        match convert::boolean("PRIMARY_SOURCE", value) {
            Ok(b) => Some(b),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    });
    let dose_sequence = row.get("DOSE_SEQUENCE").and_then(|value| {
        match convert::dose_sequence("DOSE_SEQUENCE", value) {
            Ok(n) => Some(n),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    });
    let dose_amount = row.get("DOSE_AMOUNT").and_then(|value| {
        match convert::dose_amount("DOSE_AMOUNT", value) {
            Ok(n) => Some(n),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    });

    if !errors.is_empty() {
        let detail = errors
            .iter()
            .map(|e| format!("{}: {}", e.column, e.reason))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Diagnostic::new(
            DiagnosticKind::InvalidConversion,
            format!("Unable to convert row to a canonical record ({detail})"),
        ));
    }

    Ok(CanonicalRecord {
        vaccine_type,
        identifier: RecordIdentifier::new(unique_id_uri, unique_id),
        patient: PatientSubject {
            nhs_number: row.get("NHS_NUMBER").map(str::to_string),
            forename: row.get("PERSON_FORENAME").map(str::to_string),
            surname: row.get("PERSON_SURNAME").map(str::to_string),
            date_of_birth,
            gender,
            postcode: row.get("PERSON_POSTCODE").map(str::to_string),
        },
        event: VaccinationEvent {
            occurrence,
            recorded,
            primary_source,
            procedure: CodedValue::from_columns(
                row.get("VACCINATION_PROCEDURE_CODE"),
                row.get("VACCINATION_PROCEDURE_TERM"),
            ),
            dose_sequence,
            product: CodedValue::from_columns(
                row.get("VACCINE_PRODUCT_CODE"),
                row.get("VACCINE_PRODUCT_TERM"),
            ),
            manufacturer: row.get("VACCINE_MANUFACTURER").map(str::to_string),
            batch_number: row.get("BATCH_NUMBER").map(str::to_string),
            expiry_date,
            site_of_vaccination: CodedValue::from_columns(
                row.get("SITE_OF_VACCINATION_CODE"),
                row.get("SITE_OF_VACCINATION_TERM"),
            ),
            route_of_vaccination: CodedValue::from_columns(
                row.get("ROUTE_OF_VACCINATION_CODE"),
                row.get("ROUTE_OF_VACCINATION_TERM"),
            ),
            dose_amount,
            dose_unit: CodedValue::from_columns(
                row.get("DOSE_UNIT_CODE"),
                row.get("DOSE_UNIT_TERM"),
            ),
            indication_code: row.get("INDICATION_CODE").map(str::to_string),
            performing_professional_forename: row
                .get("PERFORMING_PROFESSIONAL_FORENAME")
                .map(str::to_string),
            performing_professional_surname: row
                .get("PERFORMING_PROFESSIONAL_SURNAME")
                .map(str::to_string),
            location_code: row.get("LOCATION_CODE").map(str::to_string),
            location_code_type_uri: row.get("LOCATION_CODE_TYPE_URI").map(str::to_string),
            site_code: row.get("SITE_CODE").map(str::to_string),
            site_code_type_uri: row.get("SITE_CODE_TYPE_URI").map(str::to_string),
        },
        target_diseases: target_diseases(vaccine_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::headers::{expected_header_line, CsvBody, EXPECTED_CSV_HEADERS};

    fn body_for(values: &[(&str, &str)]) -> CsvBody {
        let mut row = vec![String::new(); EXPECTED_CSV_HEADERS.len()];
        for (column, value) in values {
            let index = EXPECTED_CSV_HEADERS.iter().position(|h| h == column).unwrap();
            row[index] = value.to_string();
        }
        CsvBody::parse(&format!("{}\n{}", expected_header_line(), row.join("|"))).unwrap()
    }

    fn all_operations() -> HashSet<Operation> {
        [Operation::Create, Operation::Update, Operation::Delete]
            .into_iter()
            .collect()
    }

    fn valid_columns() -> Vec<(&'static str, &'static str)> {
        vec![
            ("NHS_NUMBER", "9990548609"),
            ("PERSON_FORENAME", "SALLY"),
            ("PERSON_SURNAME", "PHARMACIST"),
            ("PERSON_DOB", "19560720"),
            ("PERSON_GENDER_CODE", "2"),
            ("PERSON_POSTCODE", "T1 1AA"),
            ("DATE_AND_TIME", "20240101T12000000"),
            ("UNIQUE_ID", "0001_RSV_v5"),
            ("UNIQUE_ID_URI", "https://supplierABC/identifiers/vacc"),
            ("ACTION_FLAG", "NEW"),
            ("RECORDED_DATE", "20240101"),
            ("PRIMARY_SOURCE", "TRUE"),
            ("VACCINATION_PROCEDURE_CODE", "956951000000104"),
            ("DOSE_SEQUENCE", "1"),
            ("DOSE_AMOUNT", "0.5"),
            ("BATCH_NUMBER", "RSVB1"),
            ("EXPIRY_DATE", "20241231"),
        ]
    }

    #[test]
    fn test_valid_row_produces_record() {
        let body = body_for(&valid_columns());
        let processed = process_row(VaccineType::Rsv, &all_operations(), &body.rows().next().unwrap());

        assert_eq!(processed.operation_requested, Some(Operation::Create));
        let record = match processed.payload {
            RowPayload::Record(record) => record,
            RowPayload::Diagnostic(d) => panic!("expected record, got {d:?}"),
        };
        assert_eq!(record.identifier.value, "0001_RSV_v5");
        assert_eq!(record.identifier.system, "https://supplierABC/identifiers/vacc");
        assert_eq!(record.patient.gender.as_deref(), Some("female"));
        assert_eq!(record.patient.date_of_birth.as_deref(), Some("1956-07-20"));
        assert_eq!(
            record.event.occurrence.as_deref(),
            Some("2024-01-01T12:00:00+00:00")
        );
        assert_eq!(record.event.primary_source, Some(true));
        assert_eq!(record.event.dose_amount, Some(0.5));
        assert_eq!(record.target_diseases.len(), 1);
        assert_eq!(record.target_diseases[0].code, "55735004");
    }

    #[test]
    fn test_invalid_action_flag() {
        let mut columns = valid_columns();
        columns.retain(|(c, _)| *c != "ACTION_FLAG");
        columns.push(("ACTION_FLAG", "CREATE"));
        let body = body_for(&columns);
        let processed = process_row(VaccineType::Rsv, &all_operations(), &body.rows().next().unwrap());

        assert_eq!(processed.operation_requested, None);
        let diagnostic = match processed.payload {
            RowPayload::Diagnostic(d) => d,
            RowPayload::Record(_) => panic!("expected diagnostic"),
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::InvalidActionFlag);
        // The local id is still reportable
        assert!(processed.local_id.as_str().contains("0001_RSV_v5"));
    }

    #[test]
    fn test_operation_outside_permitted_set() {
        let body = body_for(&valid_columns());
        let only_update: HashSet<Operation> = [Operation::Update].into_iter().collect();
        let processed = process_row(VaccineType::Rsv, &only_update, &body.rows().next().unwrap());

        let diagnostic = match processed.payload {
            RowPayload::Diagnostic(d) => d,
            RowPayload::Record(_) => panic!("expected diagnostic"),
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::NoOperationPermission);
        assert_eq!(processed.operation_requested, Some(Operation::Create));
    }

    #[test]
    fn test_missing_unique_id_uri() {
        let mut columns = valid_columns();
        columns.retain(|(c, _)| *c != "UNIQUE_ID_URI");
        let body = body_for(&columns);
        let processed = process_row(VaccineType::Rsv, &all_operations(), &body.rows().next().unwrap());

        let diagnostic = match processed.payload {
            RowPayload::Diagnostic(d) => d,
            RowPayload::Record(_) => panic!("expected diagnostic"),
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::MissingUniqueId);
    }

    #[test]
    fn test_malformed_conversion_becomes_diagnostic() {
        let mut columns = valid_columns();
        columns.retain(|(c, _)| *c != "PERSON_DOB");
        columns.push(("PERSON_DOB", "20th July 1956"));
        let body = body_for(&columns);
        let processed = process_row(VaccineType::Rsv, &all_operations(), &body.rows().next().unwrap());

        let diagnostic = match processed.payload {
            RowPayload::Diagnostic(d) => d,
            RowPayload::Record(_) => panic!("expected diagnostic"),
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::InvalidConversion);
        assert!(diagnostic.message.contains("PERSON_DOB"));
    }
}
