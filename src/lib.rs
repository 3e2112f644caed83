// Vaxbatch - Vaccination Batch Ingestion Pipeline
// Copyright (c) 2025 Vaxbatch Contributors
// Licensed under the MIT License

//! # Vaxbatch - Vaccination Batch Ingestion Pipeline
//!
//! Vaxbatch ingests supplier-submitted vaccination batch files, validates and
//! transforms each row into a canonical clinical record, persists it with
//! identifier-uniqueness guarantees, and reports a per-row outcome back to
//! the supplier through an accumulating acknowledgment report.
//!
//! ## Architecture
//!
//! Vaxbatch follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline stages (admission, ledger, transform, forward, ack)
//! - [`adapters`] - External service traits and implementations (object
//!   storage, permission cache, file queue, audit ledger, record store)
//! - [`domain`] - Core domain types, wire messages and validation outcomes
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Pipeline
//!
//! An object-arrival event flows through five stages:
//!
//! 1. **Admission control** validates the file key, authorizes the supplier
//!    against the permission cache, records the file in the audit ledger and
//!    enqueues it FIFO per `{supplier}_{vaccine_type}` queue.
//! 2. **The audit ledger** orders files within a queue; a file is handed to
//!    row processing only after its predecessor is Processed (pull-chaining,
//!    not a worker loop).
//! 3. **Row transform** re-validates the file body and converts each row to
//!    a canonical record or a diagnostic, dispatching exactly one message
//!    per row.
//! 4. **Forwarding** applies each row's operation to the record store with
//!    an atomic identifier-uniqueness check, producing one outcome per row.
//! 5. **The acknowledgment accumulator** renders one report line per outcome
//!    and re-uploads the growing report object.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vaxbatch::config::VaxbatchConfig;
//! use vaxbatch::core::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VaxbatchConfig::default();
//!     let pipeline = Pipeline::new(&config)?;
//!
//!     let outcome = pipeline
//!         .handle_arrival("data-sources", "FLU_Vaccinations_V5_YGM41_20240101T120000.csv")
//!         .await?;
//!
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Validation failures are values, not errors: file-level checks return
//! [`domain::FileRejection`] and row-level checks attach a
//! [`domain::Diagnostic`] to the row. Only infrastructure failures surface
//! as [`domain::BatchError`], and those propagate to the invoking event
//! source rather than being folded into supplier-visible outcomes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
