//! Counter ledger - per-country running totals in the `Zaehlungen` sheet

use crate::config::{COL_COUNT, COL_COUNTRY, SHEET_COUNTS};
use crate::error::{TallyError, TallyResult};
use crate::excel::WorkbookStore;
use crate::types::{CellValue, CountRow, SheetTable};
use tracing::{info, warn};

pub struct CounterLedger<'a> {
    store: &'a WorkbookStore,
}

impl<'a> CounterLedger<'a> {
    pub fn new(store: &'a WorkbookStore) -> Self {
        Self { store }
    }

    /// Ledger rows in sheet order, normalized (trimmed country, non-negative count)
    pub fn load(&self) -> Vec<CountRow> {
        let (table, country_col, count_col) = self.load_table();
        table
            .rows
            .iter()
            .map(|row| CountRow {
                country: row[country_col].as_text(),
                count: row[count_col].as_count(),
            })
            .collect()
    }

    /// Sum of all country totals
    pub fn total(&self) -> u64 {
        self.load().iter().map(|row| row.count).sum()
    }

    /// Add one to `country`'s total, creating its row on first use. Returns the new total.
    pub fn increment(&self, country: &str) -> TallyResult<u64> {
        let country = country.trim();
        if country.is_empty() {
            return Err(TallyError::Validation("Country must not be empty".to_string()));
        }

        let (mut table, country_col, count_col) = self.load_table();
        let matches: Vec<usize> = (0..table.len())
            .filter(|&row| table.rows[row][country_col].as_text() == country)
            .collect();

        let (row, current) = match matches.split_first() {
            None => {
                let mut row = vec![CellValue::Empty; table.width()];
                row[country_col] = CellValue::text(country);
                table.push_row(row);
                (table.len() - 1, 0)
            }
            Some((&first, duplicates)) => {
                let current: u64 = matches
                    .iter()
                    .map(|&row| table.rows[row][count_col].as_count())
                    .sum();
                if !duplicates.is_empty() {
                    warn!(
                        "Merging {} duplicate ledger rows for '{}'",
                        duplicates.len(),
                        country
                    );
                    // Duplicates all sit after `first`, so removing them keeps its index
                    for &dup in duplicates.iter().rev() {
                        table.rows.remove(dup);
                    }
                }
                (first, current)
            }
        };

        let count = current + 1;
        table.rows[row][count_col] = CellValue::Number(count as f64);

        self.store.write_sheet(SHEET_COUNTS, &table)?;
        info!("Ledger: {} → {}", country, count);
        Ok(count)
    }

    /// The ledger sheet with both columns present and their cells normalized.
    ///
    /// Extra columns are carried through untouched. Returns the table with the
    /// indices of the country and count columns.
    fn load_table(&self) -> (SheetTable, usize, usize) {
        let mut table = self.store.read_sheet(SHEET_COUNTS);
        if !table.has_column(COL_COUNTRY) || !table.has_column(COL_COUNT) {
            warn!("Ledger sheet lacks '{}'/'{}' columns, synthesizing", COL_COUNTRY, COL_COUNT);
        }
        let country_col = table.ensure_column(COL_COUNTRY);
        let count_col = table.ensure_column(COL_COUNT);

        for row in &mut table.rows {
            let country = row[country_col].as_text().trim().to_string();
            let count = row[count_col].as_count();
            row[country_col] = CellValue::Text(country);
            row[count_col] = CellValue::Number(count as f64);
        }
        (table, country_col, count_col)
    }
}
