//! Error taxonomy for manifest building, document fetching and manifest loading.

/// Failure of a single remote tree listing request.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Remote answered with a non-success status.
    #[error("HTTP error: {status} - {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Body parsed as JSON but was not an array of entries.
    #[error("listing for '{path}' is not a collection")]
    NotACollection {
        /// Path that was listed.
        path: String,
    },

    /// Body was not valid JSON or an entry had the wrong shape.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

/// Fatal manifest build failure. No manifest is written when this occurs.
#[derive(Debug, thiserror::Error)]
#[error("failed to list '{path}'")]
pub struct BuildError {
    /// Path whose listing failed.
    pub path: String,
    /// Underlying listing failure.
    #[source]
    pub source: ListingError,
}

/// Reason a document fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Remote answered with a non-success status.
    Status(u16),
    /// Network level failure.
    Transport(String),
    /// Local file could not be read.
    Io(String),
    /// Relative target with neither a site root nor a base URL to resolve it.
    Unresolvable,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::Transport(msg) => write!(f, "network error: {msg}"),
            Self::Io(msg) => write!(f, "{msg}"),
            Self::Unresolvable => write!(f, "no site root or base URL to resolve against"),
        }
    }
}

/// Document or listing fetch failure at view time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load {target}: {kind}")]
pub struct FetchError {
    /// Path or URL that was requested.
    pub target: String,
    /// What went wrong.
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(target: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// Manifest document does not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// JSON syntax error or node shape mismatch.
    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two nodes share the same path.
    #[error("duplicate path in manifest: {0}")]
    DuplicatePath(String),

    /// Manifest file could not be read or written.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Navigation tree operation failed.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// No directory with this path in the tree.
    #[error("no directory '{0}' in navigation tree")]
    UnknownDirectory(String),

    /// Directory listing has not been fetched yet.
    #[error("directory '{0}' has not been listed")]
    NotLoaded(String),

    /// Live listing of a directory failed.
    #[error("failed to list '{path}'")]
    Listing {
        /// Directory whose listing failed.
        path: String,
        /// Underlying listing failure.
        #[source]
        source: ListingError,
    },
}

/// Preference file could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Preference file is not a JSON object of strings.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}
