//! Run command implementation
//!
//! Drives one or more file-arrival events through the full pipeline against
//! the configured backends.

use crate::config::load_config;
use crate::core::admission::ArrivalOutcome;
use crate::core::pipeline::Pipeline;
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// File keys to process, in arrival order
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Bucket the files arrived in (defaults to the configured source bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;
        let pipeline = Pipeline::new(&config)?;
        let bucket = self
            .bucket
            .clone()
            .unwrap_or_else(|| config.storage.source_bucket.clone());

        println!("🚀 Processing {} file(s) from '{bucket}'", self.files.len());
        println!();

        let mut rejected = 0;
        for key in &self.files {
            match pipeline.handle_arrival(&bucket, key).await {
                Ok(ArrivalOutcome::Admitted { message_id, queue_name }) => {
                    println!("✅ {key}");
                    println!("   message_id: {message_id}, queue: {queue_name}");
                }
                Ok(ArrivalOutcome::Rejected(rejection)) => {
                    rejected += 1;
                    println!("❌ {key}");
                    println!("   {} ({})", rejection.message, rejection.status_code());
                }
                Ok(ArrivalOutcome::RoutedToCacheSync) => {
                    println!("↪️  {key} routed to cache sync");
                }
                Err(e) => {
                    println!("💥 {key}");
                    println!("   Error: {e}");
                    return Err(e.into());
                }
            }
        }

        println!();
        println!("Audit ledger:");
        for record in pipeline.ledger_records().await? {
            println!(
                "  {:<60} {:?}  queue={}",
                record.filename, record.status, record.queue_name
            );
        }

        Ok(if rejected > 0 { 1 } else { 0 })
    }
}
