//! Tally - consultation dashboard over an Excel workbook
//!
//! This library records advisory consultations into an `.xlsx` workbook and
//! derives a topic × country summary matrix from it.
//!
//! # Workbook
//!
//! - `Zaehlungen`: running total per country (`Land`, `Anzahl`)
//! - one sheet per country with the individual entries
//!
//! # Example
//!
//! ```no_run
//! use consult_tally::{Dashboard, DetailPayload};
//!
//! let dashboard = Dashboard::new("DashboardApp_2025.xlsx");
//! dashboard.increment_country("Schweiz")?;
//! dashboard.append_detail(
//!     "Schweiz",
//!     "Marktberatung",
//!     &DetailPayload {
//!         employee: "Wind".to_string(),
//!         company_name: "Muster AG".to_string(),
//!         ..Default::default()
//!     },
//! )?;
//!
//! let matrix = dashboard.build_matrix();
//! assert_eq!(matrix.get("Marktberatung", "Schweiz"), Some(1));
//! # Ok::<(), consult_tally::error::TallyError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod excel;
pub mod ledger;
pub mod types;
pub mod wizard;

// Re-export commonly used types
pub use crate::core::Matrix;
pub use dashboard::Dashboard;
pub use error::{TallyError, TallyResult};
pub use types::{CountRow, DetailPayload, DetailRecord};
