//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for vaxbatch using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Vaxbatch - vaccination batch ingestion pipeline
#[derive(Parser, Debug)]
#[command(name = "vaxbatch")]
#[command(version, about, long_about = None)]
#[command(author = "Vaxbatch Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vaxbatch.toml", env = "VAXBATCH_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VAXBATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run submitted batch files through the pipeline
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show acknowledgment reports present in the acknowledgment bucket
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
