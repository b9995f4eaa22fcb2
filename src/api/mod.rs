//! Tally API server module
//!
//! HTTP REST API over the dashboard workbook.
//! Run with `tally-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
