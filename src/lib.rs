//! Lead Enrichment Library
//!
//! Fills in email, phone, title and profile data for sparse contact records
//! (name + company) by running a waterfall over a directory lookup service and
//! a generative model, with bounded concurrency across a batch.
//!
//! # Modules
//!
//! - `batch`: Batch coordinator and statistics.
//! - `cli`: Command-line arguments.
//! - `config`: Configuration management.
//! - `csv_io`: Record source and result sink.
//! - `enrichment`: Per-lead waterfall engine.
//! - `errors`: Error handling types.
//! - `extract`: Best-effort JSON extraction from model output.
//! - `lookup`: Directory lookup adapter (Hunter.io).
//! - `model_client`: Text-completion client with retries.
//! - `models`: Core data models.
//! - `retry`: Retrying-call helper.
//! - `strategy`: Model-backed lead advisor.

pub mod batch;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod enrichment;
pub mod errors;
pub mod extract;
pub mod lookup;
pub mod model_client;
pub mod models;
pub mod retry;
pub mod strategy;
