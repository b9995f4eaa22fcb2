//! Core aggregation over the detail sheets

pub mod aggregator;

pub use aggregator::{matrix_from_sheets, Aggregator, Matrix};
