use std::path::PathBuf;

use thiserror::Error;

use crate::session::InputKind;

#[derive(Error, Debug)]
pub enum MoodscopeError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, MoodscopeError>;

/// Transport-level failures of a single API call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} responded with status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What the user gets to see when an action fails. The message is fixed
/// per flow; the underlying cause only goes to the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{}", empty_input_message(.0))]
    EmptyInput(InputKind),

    #[error("Invalid YouTube link")]
    InvalidLink,

    #[error("{} analysis failed", .0.label())]
    NetworkOrServerFailure(InputKind),

    #[error("Failed to load analysis history")]
    HistoryFetchFailure,
}

fn empty_input_message(kind: &InputKind) -> &'static str {
    match kind {
        InputKind::Text => "Please enter text",
        InputKind::Audio => "Please select an audio file",
        InputKind::Video => "Please select a video file",
        InputKind::Youtube => "Please paste a YouTube link",
    }
}
