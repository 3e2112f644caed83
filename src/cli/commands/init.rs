//! Init command implementation
//!
//! Generates a starter configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "vaxbatch.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::starter_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Place a permissions_config.json in the config bucket");
                println!("  3. Run 'vaxbatch validate-config' to check the result");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to create configuration file: {e}");
                Ok(2)
            }
        }
    }

    fn starter_config() -> &'static str {
        r#"# Vaxbatch configuration

[application]
log_level = "info"

[storage]
# "filesystem" maps buckets onto directories under root_dir
backend = "filesystem"
root_dir = "./data"
source_bucket = "data-sources"
ack_bucket = "data-destinations"
config_bucket = "config"

[cache]
# "bucket" reads permissions_config.json from the config bucket;
# "http" reads it from a remote cache endpoint
backend = "bucket"
# endpoint = "http://cache.internal:6379"
# connect_timeout_ms = 500
# request_timeout_ms = 2000

[forwarding]
batch_size = 10

[logging]
file_enabled = false
file_path = "logs"
file_rotation = "daily"
"#
    }
}
