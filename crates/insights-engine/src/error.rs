use std::fmt;

/// Result type for insights-engine operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Why a model response could not be turned into facet records.
///
/// Every variant is a format failure; the caller retries the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Response text was empty after fence stripping
    EmptyResponse,

    /// Response parsed, but as something other than an object or list
    UnexpectedShape(String),

    /// Neither the whole-document parse nor the brace scan found a record
    NoRecords,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::EmptyResponse => write!(f, "empty response"),
            ExtractError::UnexpectedShape(kind) => write!(f, "unexpected type: {}", kind),
            ExtractError::NoRecords => {
                write!(f, "could not parse any JSON objects from response")
            }
        }
    }
}

impl std::error::Error for ExtractError {}
