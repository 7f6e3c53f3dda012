use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the remote leaderboard API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("leaderboard request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("leaderboard API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("leaderboard response could not be decoded: {0}")]
    Decode(String),
}

impl FetchError {
    /// Transport failures, 5xx and 429 are retried. Other statuses and decode
    /// errors come from the request or body itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Decode(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history document {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("history document could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart drawing failed: {0}")]
    Draw(String),
    #[error("chart I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("chart task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure of one track's refresh. Other tracks in the same cycle are unaffected.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("no track with index {0}")]
    UnknownTrack(usize),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("could not read tracks file {path}: {source}")]
    TracksIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tracks file {path} is invalid: {source}")]
    TracksFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("at least one track must be configured")]
    NoTracks,
}
