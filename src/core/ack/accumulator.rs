//! Acknowledgment report accumulator
//!
//! Builds the supplier-visible report objects in the acknowledgment bucket.
//! The business report grows one line per row outcome; because object
//! storage has no partial-write primitive, every append re-uploads the full
//! accumulated content. There is no explicit completion marker: the report
//! is complete when its data line count matches the source row count.

use crate::adapters::object_store::ObjectStore;
use crate::core::ack::line::{
    business_ack_row, business_header_line, infrastructure_ack_row, infrastructure_header_line,
};
use crate::domain::{Result, RowOutcome};
use std::sync::Arc;

/// Derive the business report key from the original file key
///
/// `{key minus extension}` becomes `forwardedFile/{stem}_BusAck_{created_at}.csv`.
pub fn business_ack_key(file_key: &str, created_at_formatted_string: &str) -> String {
    let stem = file_key.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_key);
    format!("forwardedFile/{stem}_BusAck_{created_at_formatted_string}.csv")
}

/// Derive the infrastructure report key from the original file key
pub fn infrastructure_ack_key(file_key: &str) -> String {
    let stem = file_key.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_key);
    format!("ack/{stem}_InfAck.csv")
}

/// Accumulating acknowledgment report writer
pub struct AckAccumulator {
    object_store: Arc<dyn ObjectStore>,
    ack_bucket: String,
}

impl AckAccumulator {
    /// Create a new accumulator writing to the given acknowledgment bucket
    pub fn new(object_store: Arc<dyn ObjectStore>, ack_bucket: impl Into<String>) -> Self {
        Self {
            object_store,
            ack_bucket: ack_bucket.into(),
        }
    }

    /// Append row outcomes to the business report for their file
    ///
    /// All outcomes in one call must belong to the same file (FIFO delivery
    /// guarantees this for a correctly partitioned queue). The existing
    /// report content is fetched, extended one line per outcome in order,
    /// and re-uploaded in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be read or written.
    pub async fn append_outcomes(&self, outcomes: &[RowOutcome]) -> Result<()> {
        let Some(first) = outcomes.first() else {
            return Ok(());
        };

        let report_key = business_ack_key(&first.file_key, &first.created_at_formatted_string);
        let mut content = self.obtain_current_content(&report_key).await?;

        for outcome in outcomes {
            content.push_str(&business_ack_row(outcome));
            content.push('\n');
        }

        self.object_store
            .put(&self.ack_bucket, &report_key, &content)
            .await?;

        tracing::info!(
            file_key = %first.file_key,
            report_key = %report_key,
            appended = outcomes.len(),
            "Acknowledgment report updated"
        );
        Ok(())
    }

    /// Write the single-row infrastructure acknowledgment for a file
    ///
    /// Used both for admission failures (nothing was read from the file
    /// body, so no row detail is possible) and for the file-level validation
    /// outcome before row processing begins.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub async fn upload_infrastructure_ack(
        &self,
        message_id: &str,
        file_key: &str,
        validation_passed: bool,
        delivered: bool,
        created_at_formatted_string: &str,
    ) -> Result<()> {
        let report_key = infrastructure_ack_key(file_key);
        let content = format!(
            "{}\n{}\n",
            infrastructure_header_line(),
            infrastructure_ack_row(
                message_id,
                validation_passed,
                delivered,
                created_at_formatted_string
            )
        );

        self.object_store
            .put(&self.ack_bucket, &report_key, &content)
            .await?;

        tracing::info!(
            file_key = %file_key,
            report_key = %report_key,
            validation_passed = validation_passed,
            "Infrastructure acknowledgment uploaded"
        );
        Ok(())
    }

    /// Current report content, or a fresh header-only report
    async fn obtain_current_content(&self, report_key: &str) -> Result<String> {
        match self
            .object_store
            .get_optional(&self.ack_bucket, report_key)
            .await?
        {
            Some(existing) => Ok(existing),
            None => {
                tracing::info!(report_key = %report_key, "Starting new acknowledgment report");
                Ok(format!("{}\n", business_header_line()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::object_store::MemoryObjectStore;
    use crate::domain::{Diagnostic, DiagnosticKind, LocalId, MessageId, RecordId, RowId};

    fn outcome(row: usize, delivered: bool) -> RowOutcome {
        RowOutcome {
            row_id: RowId::new(&MessageId::new("m1").unwrap(), row),
            file_key: "RSV_Vaccinations_V5_X26_20240101T120000.CSV".to_string(),
            created_at_formatted_string: "20240101T12000000".to_string(),
            local_id: LocalId::new(&format!("000{row}"), "https://supplier/ids"),
            delivered,
            diagnostic: (!delivered)
                .then(|| Diagnostic::new(DiagnosticKind::ResourceNotFound, "not found")),
            record_id: delivered.then(RecordId::generate),
        }
    }

    #[tokio::test]
    async fn test_report_accumulates_one_line_per_outcome() {
        let store = Arc::new(MemoryObjectStore::new());
        let accumulator = AckAccumulator::new(store.clone(), "acks");

        accumulator.append_outcomes(&[outcome(1, true)]).await.unwrap();
        accumulator
            .append_outcomes(&[outcome(2, false), outcome(3, true)])
            .await
            .unwrap();

        let report_key = business_ack_key(
            "RSV_Vaccinations_V5_X26_20240101T120000.CSV",
            "20240101T12000000",
        );
        let content = store.get("acks", &report_key).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 data lines
        assert!(lines[0].starts_with("MESSAGE_HEADER_ID|"));
        assert!(lines[1].starts_with("m1#1|OK|"));
        assert!(lines[2].starts_with("m1#2|Fatal Error|"));
        assert!(lines[3].starts_with("m1#3|OK|"));
    }

    #[tokio::test]
    async fn test_header_written_exactly_once() {
        let store = Arc::new(MemoryObjectStore::new());
        let accumulator = AckAccumulator::new(store.clone(), "acks");
        for row in 1..=3 {
            accumulator.append_outcomes(&[outcome(row, true)]).await.unwrap();
        }

        let report_key = business_ack_key(
            "RSV_Vaccinations_V5_X26_20240101T120000.CSV",
            "20240101T12000000",
        );
        let content = store.get("acks", &report_key).await.unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("MESSAGE_HEADER_ID"))
            .count();
        assert_eq!(header_count, 1);
    }

    #[tokio::test]
    async fn test_empty_outcome_slice_is_a_noop() {
        let store = Arc::new(MemoryObjectStore::new());
        let accumulator = AckAccumulator::new(store.clone(), "acks");
        accumulator.append_outcomes(&[]).await.unwrap();
        assert!(store.list_keys("acks").await.is_empty());
    }

    #[tokio::test]
    async fn test_infrastructure_ack_key_derivation() {
        assert_eq!(
            infrastructure_ack_key("FLU_Vaccinations_V5_YGM41_20240101T120000.CSV"),
            "ack/FLU_Vaccinations_V5_YGM41_20240101T120000_InfAck.csv"
        );
        assert_eq!(
            business_ack_key("a_b_c_d_e.csv", "20240101T12000000"),
            "forwardedFile/a_b_c_d_e_BusAck_20240101T12000000.csv"
        );
    }

    #[tokio::test]
    async fn test_infrastructure_ack_is_single_row() {
        let store = Arc::new(MemoryObjectStore::new());
        let accumulator = AckAccumulator::new(store.clone(), "acks");
        accumulator
            .upload_infrastructure_ack(
                "m1",
                "FLU_Vaccinations_V5_YGM41_20240101T120000.CSV",
                false,
                false,
                "20240101T12000000",
            )
            .await
            .unwrap();

        let content = store
            .get("acks", "ack/FLU_Vaccinations_V5_YGM41_20240101T120000_InfAck.csv")
            .await
            .unwrap();
        assert_eq!(content.lines().count(), 2); // header + 1 row
    }
}
