// Platform Error Types

/// Errors a platform implementation may surface at the boundary.
///
/// The player treats all of these as soft failures: last-known-good state
/// is retained and nothing is surfaced to the user as an error.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Room not found")]
    NotFound,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Platform API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
