use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

//==============================================================================
// Cell values
//==============================================================================

/// A single worksheet cell, reduced to the value kinds the dashboard stores
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Latest serial Excel can display (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Day zero of the 1900 date system, shifted past the fictitious 1900-02-29.
fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert an Excel serial date (1900 system) to a datetime, rounded to the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    excel_epoch().checked_add_signed(chrono::Duration::seconds(seconds))
}

/// Convert a datetime to an Excel serial date (1900 system), dropping sub-second precision.
pub fn datetime_to_excel_serial(datetime: &NaiveDateTime) -> f64 {
    let seconds = (*datetime - excel_epoch()).num_seconds();
    seconds as f64 / SECONDS_PER_DAY
}

/// Current local time truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

impl CellValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell as text the way a spreadsheet user would read it.
    ///
    /// Integral numbers drop their fraction so numeric ident numbers stay intact.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Coerce the cell to a non-negative count; anything unparseable counts as zero.
    pub fn as_count(&self) -> u64 {
        let value = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if value.is_finite() && value > 0.0 {
            value.trunc() as u64
        } else {
            0
        }
    }

    /// Interpret the cell as a timestamp (native datetime, serial number, or ISO text)
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(n) => excel_serial_to_datetime(*n),
            CellValue::Text(s) => parse_iso_datetime(s.trim()),
            _ => None,
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

//==============================================================================
// Sheet tables
//==============================================================================

/// A worksheet as a header row plus data rows.
///
/// Every data row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    /// True when the sheet holds no data rows (a header alone is still empty)
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of `name`, appending it (filled with empty cells) when missing
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(CellValue::Empty);
        }
        self.columns.len() - 1
    }

    /// Cell at (`row`, column `name`); missing rows or columns read as empty.
    pub fn cell(&self, row: usize, name: &str) -> &CellValue {
        self.column_index(name)
            .and_then(|col| self.rows.get(row).and_then(|r| r.get(col)))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn set_cell(&mut self, row: usize, name: &str, value: CellValue) {
        let col = self.ensure_column(name);
        if let Some(r) = self.rows.get_mut(row) {
            r[col] = value;
        }
    }

    /// Append a row, padding or truncating it to the table width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }
}

//==============================================================================
// Dashboard records
//==============================================================================

/// One row of the ledger sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub country: String,
    pub count: u64,
}

/// Free-text form fields of a consultation; absent fields are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailPayload {
    pub employee: String,
    pub company_name: String,
    pub contact_name: String,
    pub ident_number: String,
    pub remark: String,
}

impl DetailPayload {
    /// Copy with every field trimmed of surrounding whitespace
    pub fn trimmed(&self) -> Self {
        Self {
            employee: self.employee.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            ident_number: self.ident_number.trim().to_string(),
            remark: self.remark.trim().to_string(),
        }
    }
}

/// One committed consultation as stored in a detail sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub employee: String,
    pub topic: String,
    pub company_name: String,
    pub contact_name: String,
    pub ident_number: String,
    pub remark: String,
}
