//! Workbook store - the single owner of the on-disk workbook
//!
//! Every operation opens and closes the file. Writes replace one sheet but
//! physically rewrite the whole file.

use super::{reader, writer};
use crate::config::{LEDGER_COLUMNS, SHEET_COUNTS};
use crate::error::{TallyError, TallyResult};
use crate::types::SheetTable;
use calamine::Reader;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Check that `name` is usable as an Excel worksheet name
pub fn validate_sheet_name(name: &str) -> TallyResult<()> {
    let invalid = |reason: &str| {
        Err(TallyError::InvalidSheetName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return invalid("longer than 31 characters");
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return invalid(&format!("contains forbidden character '{}'", c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return invalid("starts or ends with an apostrophe");
    }
    Ok(())
}

/// File-backed workbook store
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
}

impl WorkbookStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the workbook with an empty ledger sheet if it does not exist yet
    pub fn ensure_exists(&self) -> TallyResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating workbook directory {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| TallyError::from_io(e, parent))?;
            }
        }
        if self.path.exists() {
            return Ok(());
        }

        debug!("Creating workbook {}", self.path.display());
        writer::save_tables(&self.path, &[empty_ledger()])
    }

    /// Read a sheet, falling back to an empty table on any failure
    pub fn read_sheet(&self, name: &str) -> SheetTable {
        match self.try_read_sheet(name) {
            Ok(Some(table)) => table,
            Ok(None) => {
                debug!("Sheet '{}' not found in {}", name, self.path.display());
                SheetTable::default()
            }
            Err(e) => {
                warn!("Unreadable sheet '{}', using empty table: {}", name, e);
                SheetTable::default()
            }
        }
    }

    /// Read a sheet, distinguishing a missing sheet (`Ok(None)`) from an empty one
    pub fn try_read_sheet(&self, name: &str) -> TallyResult<Option<SheetTable>> {
        self.ensure_exists()?;
        let mut workbook = reader::open(&self.path)?;
        reader::read_sheet(&mut workbook, name)
    }

    /// Replace sheet `name` with `table`, keeping every other sheet and the sheet order.
    ///
    /// A new sheet is appended at the end.
    pub fn write_sheet(&self, name: &str, table: &SheetTable) -> TallyResult<()> {
        validate_sheet_name(name)?;
        self.ensure_exists()?;

        let mut workbook = reader::open(&self.path)?;
        let mut sheets = reader::read_all(&mut workbook)?;
        // Release the read handle before rewriting the file
        drop(workbook);

        let names: Vec<&str> = sheets.iter().map(|(sheet, _)| sheet.as_str()).collect();
        check_name_collision(name, names)?;

        match sheets.iter_mut().find(|(sheet, _)| sheet == name) {
            Some((_, existing)) => *existing = table.clone(),
            None => sheets.push((name.to_string(), table.clone())),
        }
        if !sheets.iter().any(|(sheet, _)| sheet == SHEET_COUNTS) {
            sheets.insert(0, empty_ledger());
        }

        debug!(
            "Writing sheet '{}' ({} rows) to {}",
            name,
            table.len(),
            self.path.display()
        );
        writer::save_tables(&self.path, &sheets)
    }

    /// Check that `name` can be written without clashing with a differently cased sheet
    pub fn check_sheet_name(&self, name: &str) -> TallyResult<()> {
        validate_sheet_name(name)?;
        let existing = self.list_sheet_names();
        check_name_collision(name, existing.iter().map(String::as_str))
    }

    /// All sheet names in workbook order; empty if the workbook cannot be read
    pub fn list_sheet_names(&self) -> Vec<String> {
        let result = self
            .ensure_exists()
            .and_then(|_| reader::open(&self.path))
            .map(|workbook| workbook.sheet_names().to_vec());
        match result {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list sheets in {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

/// Excel compares sheet names case-insensitively, so "usa" and "USA" are the same sheet
fn check_name_collision<'n, I>(name: &str, existing: I) -> TallyResult<()>
where
    I: IntoIterator<Item = &'n str>,
{
    let folded = name.to_lowercase();
    // The ledger is reserved even before it has been written
    let clash = existing
        .into_iter()
        .chain(std::iter::once(SHEET_COUNTS))
        .find(|sheet| *sheet != name && sheet.to_lowercase() == folded);
    match clash {
        Some(sheet) => Err(TallyError::InvalidSheetName {
            name: name.to_string(),
            reason: format!("collides with existing sheet '{}'", sheet),
        }),
        None => Ok(()),
    }
}

fn empty_ledger() -> (String, SheetTable) {
    (
        SHEET_COUNTS.to_string(),
        SheetTable::with_columns(&LEDGER_COLUMNS),
    )
}
