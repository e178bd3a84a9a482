//! Error types for margin-core

use thiserror::Error;

/// Result type alias using margin-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in margin-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network-level failure (DNS, connection reset, timeout). Never retried.
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status other than 429
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    /// HTTP 429 with the server's `Retry-After` hint (or `unknown`)
    #[error("Rate limit exceeded. Retry after {retry_after} seconds.")]
    RateLimited { retry_after: String },

    /// No API credential available at startup
    #[error("READWISE_API_TOKEN not found. Set it in the environment or in {0}.")]
    MissingCredential(String),

    /// Document does not carry a `**Readwise Book ID**` anchor
    #[error(
        "Could not find Readwise Book ID in source document. Make sure this is a valid Readwise source document."
    )]
    MissingIdentifier,

    /// A fetch succeeded but returned nothing usable
    #[error("{0}")]
    NoResults(String),

    /// Cursor loop exceeded the configured page limit
    #[error("Pagination stopped after {0} pages without reaching the end of the collection")]
    PaginationLimit(usize),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Things URL actions that modify existing items need an auth token
    #[error(
        "Things auth token not configured. Enable Things URLs in Things > Settings > General, then run `margin tasks set-token <TOKEN>` or set THINGS_AUTH_TOKEN."
    )]
    MissingAuthToken,

    /// Things database error
    #[error("Task store error: {0}")]
    TaskStore(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}
