use std::fmt;

/// Unified error type for the collection pipeline.
///
/// Only fatal conditions surface here. Row-level defects become
/// `RowDiagnostic`s, and soft failures (image lookup, rate providers)
/// become null fields in the snapshot.
#[derive(Debug)]
pub enum CollectionError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// HTTP error status code
    HttpStatus(reqwest::StatusCode),
    /// Listing page has no offer table; no offers can be recovered
    TableNotFound,
    /// Failed to parse JSON (persisted cache state)
    Parse(serde_json::Error),
    /// File I/O error
    Io(std::io::Error),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Network(e) => write!(f, "Network error: {}", e),
            CollectionError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
            CollectionError::TableNotFound => write!(f, "Listing table not found in page"),
            CollectionError::Parse(e) => write!(f, "Parse error: {}", e),
            CollectionError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Network(e) => Some(e),
            CollectionError::Parse(e) => Some(e),
            CollectionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CollectionError {
    fn from(err: reqwest::Error) -> Self {
        CollectionError::Network(err)
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        CollectionError::Parse(err)
    }
}

impl From<std::io::Error> for CollectionError {
    fn from(err: std::io::Error) -> Self {
        CollectionError::Io(err)
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CollectionError>;
