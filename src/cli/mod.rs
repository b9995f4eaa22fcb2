//! CLI command handlers

pub mod commands;

pub use commands::{counts, entries, init, options, overview, record, sheets, watch, RecordArgs};
