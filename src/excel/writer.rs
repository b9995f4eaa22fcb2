//! Workbook writer - sheet tables → Excel (.xlsx)

use crate::error::{TallyError, TallyResult};
use crate::types::{datetime_to_excel_serial, CellValue, SheetTable};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::path::Path;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const MAX_COLUMNS: usize = 16_384;

/// Serialize `sheets` (in order) into one workbook and write it to `path` in a single write
pub(crate) fn save_tables(path: &Path, sheets: &[(String, SheetTable)]) -> TallyResult<()> {
    let buffer = tables_to_buffer(sheets)?;
    fs::write(path, buffer).map_err(|e| TallyError::from_io(e, path))?;
    Ok(())
}

/// Serialize `sheets` into xlsx bytes without touching the filesystem
pub(crate) fn tables_to_buffer(sheets: &[(String, SheetTable)]) -> TallyResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .map_err(|e| TallyError::Workbook(format!("Failed to set sheet name '{}': {}", name, e)))?;
        write_table(worksheet, table, &header_format, &datetime_format)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| TallyError::Workbook(format!("Failed to build workbook: {}", e)))
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &SheetTable,
    header_format: &Format,
    datetime_format: &Format,
) -> TallyResult<()> {
    if table.width() > MAX_COLUMNS {
        return Err(TallyError::Workbook(format!(
            "Sheet has {} columns, Excel allows {}",
            table.width(),
            MAX_COLUMNS
        )));
    }

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, header_format)
            .map_err(|e| TallyError::Workbook(format!("Failed to write header: {}", e)))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            write_cell(worksheet, excel_row, col as u16, value, datetime_format)?;
        }
    }

    if !table.rows.is_empty() && table.width() > 0 {
        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| TallyError::Workbook(format!("Failed to freeze header: {}", e)))?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    datetime_format: &Format,
) -> TallyResult<()> {
    let result = match value {
        // Blank cells are left unwritten so they read back as empty
        CellValue::Empty => return Ok(()),
        CellValue::Text(s) if s.is_empty() => return Ok(()),
        CellValue::Text(s) => worksheet.write_string(row, col, s),
        CellValue::Number(n) => worksheet.write_number(row, col, *n),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
        CellValue::DateTime(dt) => worksheet.write_number_with_format(
            row,
            col,
            datetime_to_excel_serial(dt),
            datetime_format,
        ),
    };
    result
        .map(|_| ())
        .map_err(|e| TallyError::Workbook(format!("Failed to write cell ({}, {}): {}", row, col, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_to_buffer_produces_zip() {
        let mut table = SheetTable::with_columns(&["Land", "Anzahl"]);
        table.push_row(vec![CellValue::text("USA"), CellValue::Number(2.0)]);
        let buffer = tables_to_buffer(&[("Zaehlungen".to_string(), table)]).unwrap();
        // xlsx is a zip container
        assert_eq!(&buffer[..2], b"PK");
    }

    #[test]
    fn test_tables_to_buffer_rejects_duplicate_names() {
        let table = SheetTable::with_columns(&["a"]);
        let sheets = vec![
            ("Dup".to_string(), table.clone()),
            ("Dup".to_string(), table),
        ];
        assert!(tables_to_buffer(&sheets).is_err());
    }

    #[test]
    fn test_tables_to_buffer_empty_sheet() {
        let buffer = tables_to_buffer(&[("Leer".to_string(), SheetTable::default())]).unwrap();
        assert!(!buffer.is_empty());
    }
}
