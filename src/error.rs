use std::path::PathBuf;
use thiserror::Error;

pub type TallyResult<T> = Result<T, TallyError>;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook is open or locked: {}. Close the file and retry.", path.display())]
    LockedFile { path: PathBuf },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid wizard transition: {0}")]
    InvalidTransition(String),
}

impl TallyError {
    /// Classify an I/O failure against `path`, separating lock conflicts from other errors.
    ///
    /// Windows reports a file held open by Excel as a sharing violation (32) or a
    /// lock violation (33); everywhere else it surfaces as `PermissionDenied`.
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if is_lock_error(&err) {
            TallyError::LockedFile { path: path.into() }
        } else {
            TallyError::Io(err)
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, TallyError::LockedFile { .. })
    }
}

fn is_lock_error(err: &std::io::Error) -> bool {
    const ERROR_SHARING_VIOLATION: i32 = 32;
    const ERROR_LOCK_VIOLATION: i32 = 33;

    if err.kind() == std::io::ErrorKind::PermissionDenied {
        return true;
    }
    cfg!(windows)
        && matches!(
            err.raw_os_error(),
            Some(ERROR_SHARING_VIOLATION) | Some(ERROR_LOCK_VIOLATION)
        )
}
