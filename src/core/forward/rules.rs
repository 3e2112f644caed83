//! Business rule re-validation
//!
//! Canonical records are re-validated against field-level rules before any
//! store operation. The rule table here is representative rather than
//! exhaustive: mandatory fields shared by every vaccine type plus
//! required-if rules that vary by vaccine type. A violation produces a
//! 400-class diagnostic naming every failed rule.

use crate::domain::{CanonicalRecord, Diagnostic, DiagnosticKind, VaccineType};
use regex::Regex;

/// Validate a canonical record against the business rule set
///
/// # Errors
///
/// Returns a `RuleViolation` diagnostic listing every violated rule.
pub fn validate_record(record: &CanonicalRecord) -> Result<(), Diagnostic> {
    let mut violations: Vec<String> = Vec::new();

    if record.event.occurrence.is_none() {
        violations.push("DATE_AND_TIME is mandatory".to_string());
    }
    if record.event.recorded.is_none() {
        violations.push("RECORDED_DATE is mandatory".to_string());
    }
    if record.event.primary_source.is_none() {
        violations.push("PRIMARY_SOURCE is mandatory".to_string());
    }
    if record.event.procedure.is_none() {
        violations.push("VACCINATION_PROCEDURE_CODE is mandatory".to_string());
    }

    if let Some(nhs_number) = &record.patient.nhs_number {
        if !Regex::new(r"^\d{10}$").unwrap().is_match(nhs_number) {
            violations.push(format!(
                "NHS_NUMBER must be 10 digits, got '{nhs_number}'"
            ));
        }
    }

    // Required-if rules varying by vaccine type
    match record.vaccine_type {
        VaccineType::Covid19 | VaccineType::Rsv => {
            if record.event.batch_number.is_none() {
                violations.push(format!(
                    "BATCH_NUMBER is mandatory for {}",
                    record.vaccine_type
                ));
            }
            if record.event.expiry_date.is_none() {
                violations.push(format!(
                    "EXPIRY_DATE is mandatory for {}",
                    record.vaccine_type
                ));
            }
        }
        VaccineType::Flu | VaccineType::Mmr => {}
    }
    if record.vaccine_type == VaccineType::Covid19 && record.event.dose_sequence.is_none() {
        violations.push("DOSE_SEQUENCE is mandatory for COVID19".to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Diagnostic::new(
            DiagnosticKind::RuleViolation,
            violations.join("; "),
        ))
    }
}
