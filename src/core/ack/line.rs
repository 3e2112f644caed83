//! Acknowledgment line rendering
//!
//! Two pipe-delimited row shapes are reported back to suppliers:
//!
//! - **Business rows** (14 columns), one per data row, carrying the final
//!   per-row outcome. Success rows use the `30001` response code family,
//!   failure rows `30002` with the diagnostic text in OPERATION_OUTCOME.
//! - **Infrastructure rows** (12 columns, no IMMS_ID/OPERATION_OUTCOME),
//!   one per file-level event, using the `10001`/`10002`/`20013` technical
//!   code family.

use crate::domain::RowOutcome;

/// Business acknowledgment headers, in column order
pub const BUSINESS_ACK_HEADERS: [&str; 14] = [
    "MESSAGE_HEADER_ID",
    "HEADER_RESPONSE_CODE",
    "ISSUE_SEVERITY",
    "ISSUE_CODE",
    "ISSUE_DETAILS_CODE",
    "RESPONSE_TYPE",
    "RESPONSE_CODE",
    "RESPONSE_DISPLAY",
    "RECEIVED_TIME",
    "MAILBOX_FROM",
    "LOCAL_ID",
    "IMMS_ID",
    "OPERATION_OUTCOME",
    "MESSAGE_DELIVERY",
];

/// Infrastructure acknowledgment headers, in column order
pub const INFRASTRUCTURE_ACK_HEADERS: [&str; 12] = [
    "MESSAGE_HEADER_ID",
    "HEADER_RESPONSE_CODE",
    "ISSUE_SEVERITY",
    "ISSUE_CODE",
    "ISSUE_DETAILS_CODE",
    "RESPONSE_TYPE",
    "RESPONSE_CODE",
    "RESPONSE_DISPLAY",
    "RECEIVED_TIME",
    "MAILBOX_FROM",
    "LOCAL_ID",
    "MESSAGE_DELIVERY",
];

/// Render the business acknowledgment header line
pub fn business_header_line() -> String {
    BUSINESS_ACK_HEADERS.join("|")
}

/// Render the infrastructure acknowledgment header line
pub fn infrastructure_header_line() -> String {
    INFRASTRUCTURE_ACK_HEADERS.join("|")
}

/// Render one business acknowledgment row for a row outcome
pub fn business_ack_row(outcome: &RowOutcome) -> String {
    let diagnostic_text = outcome
        .diagnostic
        .as_ref()
        .map(|d| flatten_to_single_line(&d.message));
    let success = outcome.delivered;

    let columns: [&str; 14] = [
        outcome.row_id.as_str(),
        if success { "OK" } else { "Fatal Error" },
        if diagnostic_text.is_none() { "Information" } else { "Fatal" },
        if diagnostic_text.is_none() { "OK" } else { "Fatal Error" },
        if diagnostic_text.is_none() { "30001" } else { "30002" },
        "Business",
        if success { "30001" } else { "30002" },
        if success {
            "Success"
        } else {
            "Business Level Response Value - Processing Error"
        },
        &outcome.created_at_formatted_string,
        // MAILBOX_FROM: blank unless the file was picked up from a mailbox
        "",
        outcome.local_id.as_str(),
        outcome.record_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
        diagnostic_text.as_deref().unwrap_or(""),
        if success { "true" } else { "false" },
    ];

    join_columns(&columns)
}

/// Render one infrastructure acknowledgment row
///
/// `validation_passed` reflects file-level validation; `delivered` reflects
/// whether the file made it onto the processing queue.
pub fn infrastructure_ack_row(
    message_id: &str,
    validation_passed: bool,
    delivered: bool,
    created_at_formatted_string: &str,
) -> String {
    let success = validation_passed && delivered;

    let columns: [&str; 12] = [
        message_id,
        if success { "Success" } else { "Failure" },
        if validation_passed { "Information" } else { "Fatal" },
        if validation_passed { "OK" } else { "Fatal Error" },
        if validation_passed { "20013" } else { "10001" },
        "Technical",
        if success { "20013" } else { "10002" },
        if success {
            "Success"
        } else {
            "Infrastructure Level Response Value - Processing Error"
        },
        created_at_formatted_string,
        // MAILBOX_FROM and LOCAL_ID: blank unless picked up from a mailbox
        "",
        "",
        if delivered { "true" } else { "false" },
    ];

    join_columns(&columns)
}

/// Pack multi-line diagnostic text down to a single line
///
/// Store and rule diagnostics may span lines; the acknowledgment format is
/// one row per line.
fn flatten_to_single_line(text: &str) -> String {
    text.replace(['\r', '\n', '\t', '\u{a0}'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_columns(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| c.trim())
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Diagnostic, DiagnosticKind, LocalId, MessageId, RecordId, RowId};

    fn outcome(delivered: bool, diagnostic: Option<Diagnostic>) -> RowOutcome {
        RowOutcome {
            row_id: RowId::new(&MessageId::new("m1").unwrap(), 1),
            file_key: "RSV_Vaccinations_V5_X26_20240101T120000.CSV".to_string(),
            created_at_formatted_string: "20240101T12000000".to_string(),
            local_id: LocalId::new("0001", "https://supplier/ids"),
            delivered,
            diagnostic,
            record_id: delivered.then(|| RecordId::new("imms-1").unwrap()),
        }
    }

    #[test]
    fn test_success_row() {
        let line = business_ack_row(&outcome(true, None));
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns.len(), BUSINESS_ACK_HEADERS.len());
        assert_eq!(columns[0], "m1#1");
        assert_eq!(columns[1], "OK");
        assert_eq!(columns[2], "Information");
        assert_eq!(columns[6], "30001");
        assert_eq!(columns[7], "Success");
        assert_eq!(columns[11], "imms-1");
        assert_eq!(columns[12], "");
        assert_eq!(columns[13], "true");
    }

    #[test]
    fn test_failure_row_carries_diagnostic() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::DuplicateIdentifier,
            "The provided identifier: https://supplier/ids#0001 is duplicated",
        );
        let line = business_ack_row(&outcome(false, Some(diagnostic)));
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns[1], "Fatal Error");
        assert_eq!(columns[2], "Fatal");
        assert_eq!(columns[6], "30002");
        assert_eq!(columns[11], "");
        assert!(columns[12].contains("is duplicated"));
        assert_eq!(columns[13], "false");
    }

    #[test]
    fn test_multiline_diagnostic_is_flattened() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::RuleViolation,
            "first line\nsecond\tline\r\nthird",
        );
        let line = business_ack_row(&outcome(false, Some(diagnostic)));
        assert!(!line.contains('\n'));
        assert!(line.contains("first line second line third"));
    }

    #[test]
    fn test_infrastructure_failure_row() {
        let line = infrastructure_ack_row("m1", false, false, "20240101T12000000");
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns.len(), INFRASTRUCTURE_ACK_HEADERS.len());
        assert_eq!(columns[1], "Failure");
        assert_eq!(columns[4], "10001");
        assert_eq!(columns[6], "10002");
        assert_eq!(
            columns[7],
            "Infrastructure Level Response Value - Processing Error"
        );
        assert_eq!(columns[11], "false");
    }

    #[test]
    fn test_infrastructure_success_row() {
        let line = infrastructure_ack_row("m1", true, true, "20240101T12000000");
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns[1], "Success");
        assert_eq!(columns[4], "20013");
        assert_eq!(columns[6], "20013");
        assert_eq!(columns[11], "true");
    }
}
