//! Status command implementation
//!
//! Lists the acknowledgment reports currently present in the acknowledgment
//! bucket, which is how report completeness is observed externally.

use crate::adapters::factory::create_object_store;
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;
        let object_store = create_object_store(&config)?;
        let ack_bucket = &config.storage.ack_bucket;

        println!("📊 Acknowledgment reports in '{ack_bucket}'");
        println!();

        let infrastructure = object_store.list(ack_bucket, "ack/").await?;
        println!("Infrastructure acknowledgments ({}):", infrastructure.len());
        for key in &infrastructure {
            println!("  {key}");
        }

        println!();
        let business = object_store.list(ack_bucket, "forwardedFile/").await?;
        println!("Business acknowledgments ({}):", business.len());
        for key in &business {
            let lines = object_store
                .get(ack_bucket, key)
                .await
                .map(|content| content.lines().count().saturating_sub(1))
                .unwrap_or(0);
            println!("  {key} ({lines} data rows)");
        }

        Ok(0)
    }
}
