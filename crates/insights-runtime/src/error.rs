use std::fmt;

use crate::inference::InferenceError;

/// Result type for insights-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Session discovery or log reading failed
    Provider(insights_providers::Error),

    /// Facet cache error
    Index(insights_index::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// External executable needed by the pipeline is not installed
    MissingDependency(String),

    /// The inference backend failed
    Inference(InferenceError),

    /// An operation needed cached facets and found none
    EmptyCache(String),
}

impl Error {
    /// Errors that should stop the process rather than skip a step
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::MissingDependency(_)
                | Error::Provider(insights_providers::Error::CorpusNotFound(_))
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Provider(err) => write!(f, "Provider error: {}", err),
            Error::Index(err) => write!(f, "Facet cache error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::MissingDependency(msg) => write!(f, "Missing dependency: {}", msg),
            Error::Inference(err) => write!(f, "Inference error: {}", err),
            Error::EmptyCache(msg) => write!(f, "No cached facets: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Provider(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Inference(err) => Some(err),
            Error::Config(_) | Error::MissingDependency(_) | Error::EmptyCache(_) => None,
        }
    }
}

impl From<insights_providers::Error> for Error {
    fn from(err: insights_providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<insights_index::Error> for Error {
    fn from(err: insights_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<InferenceError> for Error {
    fn from(err: InferenceError) -> Self {
        Error::Inference(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<insights_core::Error> for Error {
    fn from(err: insights_core::Error) -> Self {
        match err {
            insights_core::Error::Io(io) => Error::Io(io),
            insights_core::Error::Config(msg) => Error::Config(msg),
        }
    }
}
