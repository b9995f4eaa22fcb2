//! Workbook reader - Excel (.xlsx) → sheet tables

use crate::error::{TallyError, TallyResult};
use crate::types::{excel_serial_to_datetime, CellValue, SheetTable};
use calamine::{Data, Range, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub(crate) type XlsxReader = Xlsx<BufReader<File>>;

/// Open a workbook for reading, classifying lock conflicts on the way in
pub(crate) fn open(path: &Path) -> TallyResult<XlsxReader> {
    let file = File::open(path).map_err(|e| TallyError::from_io(e, path))?;
    Xlsx::new(BufReader::new(file)).map_err(|e| {
        TallyError::Workbook(format!(
            "Failed to parse workbook {}: {}",
            path.display(),
            e
        ))
    })
}

/// Read one sheet; `Ok(None)` when the workbook has no sheet of that name
pub(crate) fn read_sheet(workbook: &mut XlsxReader, name: &str) -> TallyResult<Option<SheetTable>> {
    if !workbook.sheet_names().iter().any(|s| s == name) {
        return Ok(None);
    }
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| TallyError::Workbook(format!("Failed to read sheet '{}': {}", name, e)))?;
    Ok(Some(range_to_table(&range)))
}

/// Read every sheet in workbook order
pub(crate) fn read_all(workbook: &mut XlsxReader) -> TallyResult<Vec<(String, SheetTable)>> {
    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let table = read_sheet(workbook, &name)?.unwrap_or_default();
        sheets.push((name, table));
    }
    Ok(sheets)
}

/// Convert a used range to a table: first row is the header, the rest is data
pub(crate) fn range_to_table(range: &Range<Data>) -> SheetTable {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return SheetTable::default();
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(col, cell)| match cell {
            Data::String(s) if !s.is_empty() => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => f.to_string(),
            _ => format!("col_{}", col),
        })
        .collect();

    let mut table = SheetTable::new(columns);
    for row in rows {
        // Rows that are entirely blank are formatting residue, not records
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        table.push_row(row.iter().map(convert_cell).collect());
    }
    table
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_datetime(serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(s) => CellValue::text(s.clone())
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::text(s.clone())),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_scalars() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            convert_cell(&Data::String("GB".to_string())),
            CellValue::text("GB")
        );
        assert_eq!(convert_cell(&Data::Int(4)), CellValue::Number(4.0));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_convert_cell_iso_datetime() {
        let cell = convert_cell(&Data::DateTimeIso("2025-11-03T12:54:22".to_string()));
        assert!(matches!(cell, CellValue::DateTime(_)));
    }

    #[test]
    fn test_range_to_table_empty_range() {
        let range: Range<Data> = Range::empty();
        let table = range_to_table(&range);
        assert!(table.columns.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_range_to_table_header_and_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Land".to_string()));
        range.set_value((0, 1), Data::String("Anzahl".to_string()));
        range.set_value((1, 0), Data::String("USA".to_string()));
        range.set_value((1, 1), Data::Float(3.0));
        range.set_value((2, 0), Data::String("GB".to_string()));

        let table = range_to_table(&range);
        assert_eq!(table.columns, vec!["Land", "Anzahl"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "Anzahl"), &CellValue::Number(3.0));
        assert_eq!(table.cell(1, "Anzahl"), &CellValue::Empty);
    }

    #[test]
    fn test_range_to_table_blank_header_cell() {
        let mut range: Range<Data> = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::String("Thema".to_string()));
        let table = range_to_table(&range);
        assert_eq!(table.columns, vec!["Thema", "col_1"]);
    }

    #[test]
    fn test_range_to_table_skips_blank_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 0));
        range.set_value((0, 0), Data::String("Thema".to_string()));
        range.set_value((2, 0), Data::String("XXX".to_string()));
        let table = range_to_table(&range);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "Thema"), &CellValue::text("XXX"));
    }
}
