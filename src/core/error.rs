use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the updater.
/// Every module returns `Result<T, UpdaterError>`.
#[derive(Debug, Error)]
pub enum UpdaterError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Missing or invalid Content-Length for {url}")]
    ContentLength { url: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Versions ────────────────────────────────────────
    #[error("Invalid version '{value}' for component {component}")]
    InvalidVersion { component: String, value: String },

    #[error("Server version table has no '{0}' entry")]
    MissingComponent(String),

    // ── Run phases ──────────────────────────────────────
    #[error("Unable to connect to server {0}")]
    ServerUnreachable(String),

    #[error("Unable to get profile '{profile}': {reason}")]
    ProfileFetch { profile: String, reason: String },

    #[error("Unable to find the game directory {0:?}")]
    GamePathInvalid(PathBuf),

    #[error("Unable to validate the launcher profiles in {0:?}")]
    NoProfileFile(PathBuf),

    #[error("No launcher profile named '{0}' was found")]
    NoProfileFound(String),

    #[error("This updater is outdated (server requires {required}), download the new version from:\n{url}")]
    UpdaterOutdated { required: String, url: String },

    // ── Options ─────────────────────────────────────────
    #[error("options.txt parse error: {0}")]
    Options(String),

    // ── Config ──────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type UpdaterResult<T> = Result<T, UpdaterError>;

impl From<std::io::Error> for UpdaterError {
    fn from(source: std::io::Error) -> Self {
        UpdaterError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl UpdaterError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdaterError::Io {
            path: path.into(),
            source,
        }
    }
}
