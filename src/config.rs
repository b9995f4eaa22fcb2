//! Compiled-in dashboard configuration
//!
//! The recognized countries, topics and employees are fixed at build time.
//! Only the workbook location is chosen at runtime.

use std::path::{Path, PathBuf};

/// Sheet holding the per-country running totals.
pub const SHEET_COUNTS: &str = "Zaehlungen";

/// Label for values outside the recognized lists, in both matrix dimensions.
pub const OTHER_LABEL: &str = "Sonstiges";

pub const COUNTRIES: &[&str] = &[
    "Österreich",
    "Schweiz",
    "Italien",
    "Frankreich",
    "USA",
    "GB",
    "China",
    "Polen",
    "Ungarn",
    "Tschechien",
    "Slowakei",
];

pub const TOPICS: &[&str] = &["Mitarbeiterentsendung", "Marktberatung", "XXX", "XXY"];

/// Alphabetical
pub const EMPLOYEES: &[&str] = &["Behrenz", "Glas", "Li", "Lovell", "Wind"];

// Ledger sheet columns
pub const COL_COUNTRY: &str = "Land";
pub const COL_COUNT: &str = "Anzahl";

// Detail sheet columns
pub const COL_TIMESTAMP: &str = "Zeitstempel";
pub const COL_EMPLOYEE: &str = "Mitarbeiter";
pub const COL_TOPIC: &str = "Thema";
pub const COL_COMPANY: &str = "Unternehmensname";
pub const COL_CONTACT: &str = "Ansprechpartner";
pub const COL_IDENT: &str = "Identnummer";
pub const COL_REMARK: &str = "Bemerkung";

pub const LEDGER_COLUMNS: [&str; 2] = [COL_COUNTRY, COL_COUNT];

pub const DETAIL_COLUMNS: [&str; 7] = [
    COL_TIMESTAMP,
    COL_EMPLOYEE,
    COL_TOPIC,
    COL_COMPANY,
    COL_CONTACT,
    COL_IDENT,
    COL_REMARK,
];

/// Default workbook file name when no path is configured
pub const DEFAULT_WORKBOOK: &str = "DashboardApp_2025.xlsx";

/// Environment variable overriding the workbook path
pub const WORKBOOK_ENV: &str = "TALLY_WORKBOOK";

/// Map a country to its matrix column: itself if recognized, otherwise the Other bucket.
pub fn country_bucket(country: &str) -> &str {
    if COUNTRIES.contains(&country) {
        country
    } else {
        OTHER_LABEL
    }
}

/// Map a topic to its matrix row: itself if recognized, otherwise the Other bucket.
pub fn topic_bucket(topic: &str) -> &str {
    if TOPICS.contains(&topic) {
        topic
    } else {
        OTHER_LABEL
    }
}

/// Runtime dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub workbook_path: PathBuf,
}

impl DashboardConfig {
    pub fn new<P: AsRef<Path>>(workbook_path: P) -> Self {
        Self {
            workbook_path: workbook_path.as_ref().to_path_buf(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKBOOK)
    }
}
