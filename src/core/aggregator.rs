//! Topic × country matrix built from the detail sheets

use crate::config::{country_bucket, topic_bucket, COL_TOPIC, COUNTRIES, OTHER_LABEL, TOPICS};
use crate::detail::DetailLog;
use crate::excel::WorkbookStore;
use crate::types::{CellValue, SheetTable};
use serde::Serialize;
use tracing::debug;

/// Dense count grid over the recognized topics and countries, each followed by the Other bucket.
///
/// `counts[t][c]` is the number of records for `topics[t]` under `countries[c]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    pub topics: Vec<String>,
    pub countries: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Matrix {
    /// All-zero matrix with full row and column coverage
    pub fn zeroed() -> Self {
        let topics: Vec<String> = TOPICS
            .iter()
            .chain(std::iter::once(&OTHER_LABEL))
            .map(|t| t.to_string())
            .collect();
        let countries: Vec<String> = COUNTRIES
            .iter()
            .chain(std::iter::once(&OTHER_LABEL))
            .map(|c| c.to_string())
            .collect();
        let counts = vec![vec![0; countries.len()]; topics.len()];
        Self {
            topics,
            countries,
            counts,
        }
    }

    fn topic_index(&self, topic: &str) -> Option<usize> {
        self.topics.iter().position(|t| t == topic)
    }

    fn country_index(&self, country: &str) -> Option<usize> {
        self.countries.iter().position(|c| c == country)
    }

    /// Count for a (topic bucket, country bucket) pair; `None` for labels outside the grid
    pub fn get(&self, topic: &str, country: &str) -> Option<u64> {
        let t = self.topic_index(topic)?;
        let c = self.country_index(country)?;
        Some(self.counts[t][c])
    }

    /// Count one record, bucketing raw values that fall outside the fixed lists
    pub fn record(&mut self, topic: &str, country: &str) {
        let t = self.topic_index(topic_bucket(topic));
        let c = self.country_index(country_bucket(country));
        if let (Some(t), Some(c)) = (t, c) {
            self.counts[t][c] += 1;
        }
    }

    pub fn row_total(&self, topic: &str) -> Option<u64> {
        self.topic_index(topic)
            .map(|t| self.counts[t].iter().sum())
    }

    pub fn column_total(&self, country: &str) -> Option<u64> {
        self.country_index(country)
            .map(|c| self.counts.iter().map(|row| row[c]).sum())
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Render as a sheet: `Thema` column followed by one column per country bucket
    pub fn to_table(&self) -> SheetTable {
        let mut columns = vec![COL_TOPIC.to_string()];
        columns.extend(self.countries.iter().cloned());
        let mut table = SheetTable::new(columns);
        for (topic, counts) in self.topics.iter().zip(&self.counts) {
            let mut row = vec![CellValue::text(topic.as_str())];
            row.extend(counts.iter().map(|&n| CellValue::Number(n as f64)));
            table.push_row(row);
        }
        table
    }
}

/// Build a matrix from `(sheet name, sheet)` pairs.
///
/// Sheets that are empty or have no topic column are not detail sheets and are skipped.
pub fn matrix_from_sheets<'t, I>(sheets: I) -> Matrix
where
    I: IntoIterator<Item = (&'t str, &'t SheetTable)>,
{
    let mut matrix = Matrix::zeroed();
    for (name, table) in sheets {
        if table.is_empty() || !table.has_column(COL_TOPIC) {
            debug!("Aggregator: skipping sheet '{}'", name);
            continue;
        }
        for row in 0..table.len() {
            let topic = table.cell(row, COL_TOPIC).as_text();
            matrix.record(topic.trim(), name);
        }
    }
    matrix
}

/// Recomputes the matrix from the workbook on every call
pub struct Aggregator<'a> {
    store: &'a WorkbookStore,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a WorkbookStore) -> Self {
        Self { store }
    }

    pub fn build_matrix(&self) -> Matrix {
        let sheets: Vec<(String, SheetTable)> = DetailLog::new(self.store)
            .list_detail_sheet_names()
            .into_iter()
            .map(|name| {
                let table = self.store.read_sheet(&name);
                (name, table)
            })
            .collect();
        matrix_from_sheets(sheets.iter().map(|(name, table)| (name.as_str(), table)))
    }
}
