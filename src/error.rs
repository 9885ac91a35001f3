use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single sheet. The sheet is skipped, never partially emitted.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("sheet `{sheet}` row {row} has {found} columns, expected {expected}")]
    SchemaMismatch {
        sheet: String,
        expected: usize,
        found: usize,
        row: usize,
    },

    #[error("failed to read sheet `{sheet}`: {reason}")]
    Read { sheet: String, reason: String },
}

impl SheetError {
    pub fn sheet(&self) -> &str {
        match self {
            SheetError::SchemaMismatch { sheet, .. } | SheetError::Read { sheet, .. } => sheet,
        }
    }
}

/// A workbook file name that does not follow `<Company><marker>.<ext>`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("`{file}` does not have the `.{extension}` extension")]
    Extension { file: String, extension: String },

    #[error("`{file}` does not contain the marker `{marker}`")]
    MissingMarker { file: String, marker: String },

    #[error("`{file}` has no company name before `{marker}`")]
    EmptyCompany { file: String, marker: String },
}

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("failed to open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error(transparent)]
    Name(#[from] NameError),

    /// Every sheet failed. Not fatal for the build; the caller decides what
    /// to do with the company.
    #[error("no usable sheets for `{company}` ({skipped} skipped)")]
    PartialFailure { company: String, skipped: usize },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("no usable workbooks in {} ({skipped} skipped)", dir.display())]
    CorpusEmpty { dir: PathBuf, skipped: usize },

    #[error("failed to read data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
