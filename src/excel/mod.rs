//! Excel persistence for the dashboard workbook
//!
//! - Read: calamine parses the workbook into [`SheetTable`](crate::types::SheetTable)s
//! - Write: rust_xlsxwriter serializes the full sheet list back to disk

mod reader;
mod store;
mod writer;

pub use store::{validate_sheet_name, WorkbookStore};

use crate::error::TallyResult;
use crate::types::SheetTable;
use std::path::Path;

/// Write standalone sheets to a fresh workbook at `path` (used for report export)
pub fn export_tables(path: &Path, sheets: &[(String, SheetTable)]) -> TallyResult<()> {
    for (name, _) in sheets {
        validate_sheet_name(name)?;
    }
    writer::save_tables(path, sheets)
}
