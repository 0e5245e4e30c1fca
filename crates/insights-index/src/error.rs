use std::fmt;

/// Result type for insights-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the facet cache
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Facet (de)serialization failed
    Json(serde_json::Error),

    /// Query-specific error (invalid input, not found, etc.)
    Query(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "Facet JSON error: {}", err),
            Error::Query(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Query(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Query("facet directory contains a symlink loop".to_string()),
        }
    }
}
