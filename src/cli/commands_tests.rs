use super::*;
use crate::config::OTHER_LABEL;
use chrono::NaiveDate;
use tempfile::TempDir;

fn record_args(country: &str, topic: &str, company: &str) -> RecordArgs {
    RecordArgs {
        country: country.to_string(),
        topic: topic.to_string(),
        employee: "Glas".to_string(),
        company: company.to_string(),
        ..Default::default()
    }
}

// =========================================================================
// Formatting Tests
// =========================================================================

#[test]
fn test_pad_counts_chars() {
    assert_eq!(pad("Ö", 3), "Ö  ");
    assert_eq!(pad_left("7", 3), "  7");
    assert_eq!(pad("Tschechien", 3), "Tschechien");
}

#[test]
fn test_format_matrix_shape() {
    let matrix = Matrix::zeroed();
    let lines = format_matrix(&matrix);
    // header + one line per topic + totals
    assert_eq!(lines.len(), matrix.topics.len() + 2);
    assert!(lines[0].contains("Österreich"));
    assert!(lines[0].ends_with(TOTAL_LABEL));
    assert!(lines.last().unwrap().starts_with(TOTAL_LABEL));
}

#[test]
fn test_format_matrix_lines_aligned() {
    let mut matrix = Matrix::zeroed();
    matrix.record("XXX", "USA");
    let widths: Vec<usize> = format_matrix(&matrix)
        .iter()
        .map(|l| l.chars().count())
        .collect();
    assert!(widths.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_format_counts() {
    let rows = vec![
        CountRow {
            country: "USA".to_string(),
            count: 3,
        },
        CountRow {
            country: "Österreich".to_string(),
            count: 12,
        },
    ];
    let lines = format_counts(&rows);
    assert_eq!(lines[0], "USA         3");
    assert_eq!(lines[1], "Österreich  12");
}

#[test]
fn test_format_record_includes_optional_fields() {
    let record = DetailRecord {
        timestamp: NaiveDate::from_ymd_opt(2025, 11, 3)
            .and_then(|d| d.and_hms_opt(9, 30, 0)),
        employee: "Li".to_string(),
        topic: "Marktberatung".to_string(),
        company_name: "ACME GmbH".to_string(),
        contact_name: String::new(),
        ident_number: "4711".to_string(),
        remark: String::new(),
    };
    assert_eq!(
        format_record(&record),
        "2025-11-03 09:30:00  Marktberatung  Li  ACME GmbH  | 4711"
    );
}

// =========================================================================
// Command Tests
// =========================================================================

#[test]
fn test_init_creates_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tally.xlsx");
    init(path.clone()).unwrap();
    assert!(path.exists());
    // Idempotent
    init(path).unwrap();
}

#[test]
fn test_record_counts_and_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.xlsx");

    record(path.clone(), record_args("USA", "XXX", "ACME")).unwrap();
    record(path.clone(), record_args("Kanada", "Relocation", "Maple Ltd")).unwrap();

    let dashboard = Dashboard::new(&path);
    let counts = dashboard.read_counts();
    assert_eq!(counts.len(), 2);
    let matrix = dashboard.build_matrix();
    assert_eq!(matrix.get("XXX", "USA"), Some(1));
    assert_eq!(matrix.get(OTHER_LABEL, OTHER_LABEL), Some(1));
}

#[test]
fn test_record_without_company_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.xlsx");

    let result = record(path.clone(), record_args("USA", "XXX", "  "));
    assert!(matches!(result, Err(TallyError::Validation(_))));
    assert!(!path.exists());
}

#[test]
fn test_overview_exports_matrix() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.xlsx");
    let output = dir.path().join("matrix.xlsx");

    record(path.clone(), record_args("GB", "XXY", "Tea Ltd")).unwrap();
    overview(path, Some(output.clone())).unwrap();

    let exported = crate::excel::WorkbookStore::new(&output).read_sheet(MATRIX_SHEET);
    assert_eq!(exported.cell(3, "GB").as_count(), 1);
    assert_eq!(exported.cell(3, crate::config::COL_TOPIC).as_text(), "XXY");
}

#[test]
fn test_counts_and_sheets_on_fresh_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.xlsx");
    counts(path.clone(), false).unwrap();
    counts(path.clone(), true).unwrap();
    sheets(path.clone()).unwrap();
    entries(path, "USA".to_string()).unwrap();
    options().unwrap();
}

#[test]
fn test_is_same_file_by_name() {
    let dir = TempDir::new().unwrap();
    let workbook = dir.path().join("tally.xlsx");
    assert!(is_same_file(&workbook, &workbook));
    assert!(!is_same_file(&dir.path().join("other.xlsx"), &workbook));
}

#[test]
fn test_watch_error_is_io_not_validation() {
    let err = watch_error("Failed to watch directory", notify::Error::generic("inotify limit"));
    assert!(matches!(err, TallyError::Io(_)));
    assert!(err.to_string().contains("inotify limit"));
}

#[test]
fn test_record_with_illegal_country_counts_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.xlsx");

    let result = record(path.clone(), record_args("A/B", "XXX", "ACME"));
    assert!(matches!(result, Err(TallyError::InvalidSheetName { .. })));
    assert!(Dashboard::new(&path).read_counts().is_empty());
}

#[test]
fn test_record_with_case_colliding_country_counts_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tally.xlsx");

    record(path.clone(), record_args("USA", "XXX", "ACME")).unwrap();
    let result = record(path.clone(), record_args("usa", "XXX", "Other Inc"));

    assert!(matches!(result, Err(TallyError::InvalidSheetName { .. })));
    let counts = Dashboard::new(&path).read_counts();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].count, 1);
}
