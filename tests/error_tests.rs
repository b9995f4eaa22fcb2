//! Error handling tests

use consult_tally::error::TallyError;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

#[test]
fn test_locked_file_message_is_actionable() {
    let err = TallyError::LockedFile {
        path: PathBuf::from("DashboardApp_2025.xlsx"),
    };
    let msg = err.to_string();
    assert!(msg.contains("DashboardApp_2025.xlsx"));
    assert!(msg.contains("Close the file and retry"));
    assert!(err.is_locked());
}

#[test]
fn test_from_io_permission_denied_is_locked() {
    let err = TallyError::from_io(Error::from(ErrorKind::PermissionDenied), "book.xlsx");
    assert!(matches!(err, TallyError::LockedFile { .. }));
}

#[test]
fn test_from_io_other_kinds_stay_io() {
    for kind in [ErrorKind::NotFound, ErrorKind::InvalidData, ErrorKind::Other] {
        let err = TallyError::from_io(Error::from(kind), "book.xlsx");
        assert!(matches!(err, TallyError::Io(_)), "{:?}", kind);
        assert!(!err.is_locked());
    }
}

#[cfg(windows)]
#[test]
fn test_from_io_sharing_violation_is_locked() {
    let err = TallyError::from_io(Error::from_raw_os_error(32), "book.xlsx");
    assert!(err.is_locked());
}

#[test]
fn test_io_error_conversion() {
    let err: TallyError = Error::new(ErrorKind::Other, "disk full").into();
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_invalid_sheet_name_display() {
    let err = TallyError::InvalidSheetName {
        name: "a/b".to_string(),
        reason: "contains forbidden character '/'".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Invalid sheet name 'a/b': contains forbidden character '/'"
    );
}

#[test]
fn test_validation_display() {
    let err = TallyError::Validation("Company name (Unternehmensname) is required".to_string());
    assert!(err.to_string().starts_with("Validation error:"));
}

#[cfg(unix)]
#[test]
fn test_write_to_read_only_workbook_is_locked() {
    use consult_tally::excel::WorkbookStore;
    use consult_tally::types::{CellValue, SheetTable};
    use std::fs::{self, OpenOptions, Permissions};
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("book.xlsx");
    let store = WorkbookStore::new(&path);
    store.ensure_exists().unwrap();
    fs::set_permissions(&path, Permissions::from_mode(0o444)).unwrap();

    // Privileged users (root) can write anyway; nothing to observe then
    if OpenOptions::new().write(true).open(&path).is_ok() {
        return;
    }

    let mut table = SheetTable::with_columns(&["Thema"]);
    table.push_row(vec![CellValue::text("XXX")]);
    let err = store.write_sheet("USA", &table).unwrap_err();

    assert!(err.is_locked(), "{:?}", err);
    assert!(err.to_string().contains("Close the file and retry"));
    // Reads still work while the file is held
    assert!(store.read_sheet("USA").is_empty());
}
