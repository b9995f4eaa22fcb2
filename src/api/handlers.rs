//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{COUNTRIES, EMPLOYEES, OTHER_LABEL, TOPICS};
use crate::dashboard::Dashboard;
use crate::error::{TallyError, TallyResult};
use crate::types::{CountRow, DetailRecord};
use crate::wizard::{validate_submission, FormInput, Wizard, WizardEvent, WizardOutcome};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a failed dashboard operation
pub fn status_for(err: &TallyError) -> StatusCode {
    match err {
        TallyError::Validation(_)
        | TallyError::InvalidSheetName { .. }
        | TallyError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TallyError::LockedFile { .. } => StatusCode::LOCKED,
        TallyError::Io(_) | TallyError::Workbook(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: TallyResult<T>) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Err(e) => {
            tracing::warn!("Request failed: {}", e);
            (status_for(&e), Json(ApiResponse::err(e.to_string())))
        }
    }
}

/// Run `f` on the blocking pool while holding the workbook lock.
///
/// Every read-modify-write of the workbook goes through here, so the server
/// never interleaves two writes to the same file.
async fn with_workbook<T, F>(state: &AppState, f: F) -> TallyResult<T>
where
    F: FnOnce(&Dashboard) -> TallyResult<T> + Send + 'static,
    T: Send + 'static,
{
    let _guard = state.workbook_lock.lock().await;
    let dashboard = state.dashboard.clone();
    tokio::task::spawn_blocking(move || f(&dashboard))
        .await
        .map_err(|e| TallyError::Io(std::io::Error::other(e.to_string())))?
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Tally API Server".to_string(),
        version: state.version.clone(),
        description: "HTTP API for the consultation dashboard".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("GET", "/api/v1/options", "Recognized countries, topics and employees"),
            endpoint("GET", "/api/v1/matrix", "Topic × country matrix"),
            endpoint("GET", "/api/v1/counts", "Per-country totals"),
            endpoint("GET", "/api/v1/sheets", "Detail sheet names"),
            endpoint("GET", "/api/v1/entries/:country", "Entries recorded for a country"),
            endpoint("POST", "/api/v1/entries", "Record a new consultation"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub workbook: String,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        workbook: state.dashboard.workbook_path().display().to_string(),
    }))
}

/// Options response
#[derive(Serialize)]
pub struct OptionsResponse {
    pub countries: Vec<String>,
    pub topics: Vec<String>,
    pub employees: Vec<String>,
    pub other_label: String,
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// GET /api/v1/options - Recognized selection lists
pub async fn options() -> impl IntoResponse {
    Json(ApiResponse::ok(OptionsResponse {
        countries: to_strings(COUNTRIES),
        topics: to_strings(TOPICS),
        employees: to_strings(EMPLOYEES),
        other_label: OTHER_LABEL.to_string(),
    }))
}

/// Matrix response
#[derive(Serialize)]
pub struct MatrixResponse {
    pub topics: Vec<String>,
    pub countries: Vec<String>,
    pub counts: Vec<Vec<u64>>,
    pub total: u64,
}

/// GET /api/v1/matrix - Topic × country matrix
pub async fn matrix(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = with_workbook(&state, |dashboard| {
        let matrix = dashboard.build_matrix();
        Ok(MatrixResponse {
            total: matrix.grand_total(),
            topics: matrix.topics,
            countries: matrix.countries,
            counts: matrix.counts,
        })
    })
    .await;
    respond(result)
}

/// Counts response
#[derive(Serialize)]
pub struct CountsResponse {
    pub rows: Vec<CountRow>,
    pub total: u64,
}

/// GET /api/v1/counts - Per-country totals
pub async fn counts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = with_workbook(&state, |dashboard| {
        let rows = dashboard.read_counts();
        let total = rows.iter().map(|r| r.count).sum();
        Ok(CountsResponse { rows, total })
    })
    .await;
    respond(result)
}

/// Sheets response
#[derive(Serialize)]
pub struct SheetsResponse {
    pub sheets: Vec<String>,
}

/// GET /api/v1/sheets - Detail sheet names
pub async fn sheets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = with_workbook(&state, |dashboard| {
        Ok(SheetsResponse {
            sheets: dashboard.list_detail_sheets(),
        })
    })
    .await;
    respond(result)
}

/// Entries response
#[derive(Serialize)]
pub struct EntriesResponse {
    pub country: String,
    pub entries: Vec<DetailRecord>,
}

/// GET /api/v1/entries/:country - Entries for one country
pub async fn entries(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> impl IntoResponse {
    let result = with_workbook(&state, move |dashboard| {
        let entries = dashboard.detail_records(&country);
        Ok(EntriesResponse { country, entries })
    })
    .await;
    respond(result)
}

/// Record request: the wizard's selections plus the form
#[derive(Debug, Clone, Deserialize)]
pub struct RecordRequest {
    pub country: String,
    pub topic: String,
    #[serde(default)]
    pub employee: String,
    #[serde(flatten)]
    pub form: FormInput,
}

/// Record response
#[derive(Serialize)]
pub struct RecordResponse {
    pub country: String,
    pub country_total: u64,
    pub record: DetailRecord,
}

/// Run the whole wizard for one submission
fn run_wizard(dashboard: &Dashboard, req: RecordRequest) -> TallyResult<RecordResponse> {
    // Reject the form before the ledger is touched
    validate_submission(Some(req.employee.as_str()), &req.form)?;

    let mut wizard = Wizard::new();
    let mut country_total = 0;
    let mut saved = None;
    let events = [
        WizardEvent::Start,
        WizardEvent::ChooseCountry(req.country),
        WizardEvent::ChooseTopic(req.topic),
        WizardEvent::Confirm,
        WizardEvent::ChooseEmployee(req.employee),
        WizardEvent::Submit(req.form),
    ];
    let mut country = String::new();
    for event in events {
        match wizard.handle(dashboard, event)? {
            WizardOutcome::CountryCounted {
                country: counted,
                total,
            } => {
                country = counted;
                country_total = total;
            }
            WizardOutcome::Saved(record) => saved = Some(record),
            WizardOutcome::Moved | WizardOutcome::Discarded => {}
        }
    }

    let record = saved.ok_or_else(|| {
        TallyError::InvalidTransition("Wizard finished without saving".to_string())
    })?;
    Ok(RecordResponse {
        country,
        country_total,
        record,
    })
}

/// POST /api/v1/entries - Record a consultation
pub async fn record(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordRequest>,
) -> impl IntoResponse {
    let result = with_workbook(&state, move |dashboard| run_wizard(dashboard, req)).await;
    respond(result)
}
