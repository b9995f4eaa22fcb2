//! Detail log - one append-only sheet of consultation records per country

use crate::config::{
    COL_COMPANY, COL_CONTACT, COL_EMPLOYEE, COL_IDENT, COL_REMARK, COL_TIMESTAMP, COL_TOPIC,
    DETAIL_COLUMNS, SHEET_COUNTS,
};
use crate::error::{TallyError, TallyResult};
use crate::excel::{validate_sheet_name, WorkbookStore};
use crate::types::{now_local, CellValue, DetailPayload, DetailRecord, SheetTable};
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// Check that `country` can name a detail sheet: a legal sheet name that is not the ledger's
pub fn validate_country_sheet(country: &str) -> TallyResult<()> {
    validate_sheet_name(country)?;
    if country.to_lowercase() == SHEET_COUNTS.to_lowercase() {
        return Err(TallyError::InvalidSheetName {
            name: country.to_string(),
            reason: "reserved for the counter sheet".to_string(),
        });
    }
    Ok(())
}

pub struct DetailLog<'a> {
    store: &'a WorkbookStore,
}

impl<'a> DetailLog<'a> {
    pub fn new(store: &'a WorkbookStore) -> Self {
        Self { store }
    }

    /// Check `country` against the sheets already in the workbook, before anything is written
    pub fn check_country(&self, country: &str) -> TallyResult<()> {
        let country = country.trim();
        validate_country_sheet(country)?;
        self.store.check_sheet_name(country)
    }

    /// Append one record stamped with the current local time to `country`'s sheet
    pub fn append(
        &self,
        country: &str,
        topic: &str,
        payload: &DetailPayload,
    ) -> TallyResult<DetailRecord> {
        self.append_at(country, topic, payload, now_local())
    }

    /// Append one record with an explicit timestamp
    pub fn append_at(
        &self,
        country: &str,
        topic: &str,
        payload: &DetailPayload,
        timestamp: NaiveDateTime,
    ) -> TallyResult<DetailRecord> {
        let country = country.trim();
        validate_country_sheet(country)?;

        // An unreadable workbook is an error here, not an empty sheet to overwrite
        let mut table = match self.store.try_read_sheet(country)? {
            Some(table) if !table.columns.is_empty() => table,
            _ => SheetTable::with_columns(&DETAIL_COLUMNS),
        };
        for column in DETAIL_COLUMNS {
            table.ensure_column(column);
        }

        let payload = payload.trimmed();
        let record = DetailRecord {
            timestamp: Some(timestamp),
            employee: payload.employee,
            topic: topic.trim().to_string(),
            company_name: payload.company_name,
            contact_name: payload.contact_name,
            ident_number: payload.ident_number,
            remark: payload.remark,
        };

        let mut row = vec![CellValue::Empty; table.width()];
        let fields = [
            (COL_TIMESTAMP, CellValue::DateTime(timestamp)),
            (COL_EMPLOYEE, CellValue::text(record.employee.as_str())),
            (COL_TOPIC, CellValue::text(record.topic.as_str())),
            (COL_COMPANY, CellValue::text(record.company_name.as_str())),
            (COL_CONTACT, CellValue::text(record.contact_name.as_str())),
            (COL_IDENT, CellValue::text(record.ident_number.as_str())),
            (COL_REMARK, CellValue::text(record.remark.as_str())),
        ];
        for (column, value) in fields {
            if let Some(idx) = table.column_index(column) {
                row[idx] = value;
            }
        }
        table.push_row(row);

        self.store.write_sheet(country, &table)?;
        info!(
            "Detail: appended '{}' to sheet '{}' ({} rows)",
            record.topic,
            country,
            table.len()
        );
        Ok(record)
    }

    /// Records stored for `country`, in sheet order; empty when the sheet is absent
    pub fn records(&self, country: &str) -> Vec<DetailRecord> {
        let table = self.store.read_sheet(country.trim());
        debug!("Detail: read {} rows from '{}'", table.len(), country);
        (0..table.len())
            .map(|row| DetailRecord {
                timestamp: table.cell(row, COL_TIMESTAMP).as_datetime(),
                employee: table.cell(row, COL_EMPLOYEE).as_text(),
                topic: table.cell(row, COL_TOPIC).as_text(),
                company_name: table.cell(row, COL_COMPANY).as_text(),
                contact_name: table.cell(row, COL_CONTACT).as_text(),
                ident_number: table.cell(row, COL_IDENT).as_text(),
                remark: table.cell(row, COL_REMARK).as_text(),
            })
            .collect()
    }

    /// Every sheet name except the ledger
    pub fn list_detail_sheet_names(&self) -> Vec<String> {
        self.store
            .list_sheet_names()
            .into_iter()
            .filter(|name| name != SHEET_COUNTS)
            .collect()
    }
}
