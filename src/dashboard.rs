//! Caller-facing operations over one workbook

use crate::config::DashboardConfig;
use crate::core::{Aggregator, Matrix};
use crate::detail::DetailLog;
use crate::error::TallyResult;
use crate::excel::WorkbookStore;
use crate::ledger::CounterLedger;
use crate::types::{CountRow, DetailPayload, DetailRecord};
use std::path::Path;

/// Entry point used by the wizard, the CLI and the API server
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: WorkbookStore,
}

impl Dashboard {
    pub fn new<P: AsRef<Path>>(workbook_path: P) -> Self {
        Self {
            store: WorkbookStore::new(workbook_path),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.workbook_path)
    }

    pub fn workbook_path(&self) -> &Path {
        self.store.path()
    }

    pub fn store(&self) -> &WorkbookStore {
        &self.store
    }

    pub fn ensure_workbook(&self) -> TallyResult<()> {
        self.store.ensure_exists()
    }

    pub fn read_counts(&self) -> Vec<CountRow> {
        CounterLedger::new(&self.store).load()
    }

    pub fn increment_country(&self, country: &str) -> TallyResult<u64> {
        CounterLedger::new(&self.store).increment(country)
    }

    /// Fail if `country` cannot get a detail sheet in this workbook
    pub fn check_country(&self, country: &str) -> TallyResult<()> {
        DetailLog::new(&self.store).check_country(country)
    }

    pub fn append_detail(
        &self,
        country: &str,
        topic: &str,
        payload: &DetailPayload,
    ) -> TallyResult<DetailRecord> {
        DetailLog::new(&self.store).append(country, topic, payload)
    }

    pub fn list_detail_sheets(&self) -> Vec<String> {
        DetailLog::new(&self.store).list_detail_sheet_names()
    }

    pub fn detail_records(&self, country: &str) -> Vec<DetailRecord> {
        DetailLog::new(&self.store).records(country)
    }

    pub fn build_matrix(&self) -> Matrix {
        Aggregator::new(&self.store).build_matrix()
    }
}
