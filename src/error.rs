// Error types shared by the sync pipeline and the table backends

use std::path::PathBuf;

use thiserror::Error;

// Failures of a single sync run
#[derive(Debug, Error)]
pub enum SyncError {
    // Raised before any network call is attempted
    #[error("configuration error: {0}")]
    Configuration(String),

    // Any non-200 answer from the scraping server; the body is kept for diagnosis
    #[error("server error: {status} - {body}")]
    Server { status: u16, body: String },

    #[error("request to the scraping server failed")]
    Transport(#[from] reqwest::Error),

    #[error("JSON encoding or decoding failed")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// Failures of a table backend (in-memory or CSV workbook)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sheet '{0}' does not exist")]
    MissingSheet(String),

    #[error("sheet '{0}' already exists")]
    SheetExists(String),

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid sheet format file {path}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type SyncResult<T> = Result<T, SyncError>;
