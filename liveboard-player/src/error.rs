// Player Error Types

/// Errors from the stream attacher.
///
/// None of these escape the slot: an unsupported endpoint degrades to the
/// neutral unattached state and the chain keeps running.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("Malformed endpoint: {0}")]
    MalformedEndpoint(String),

    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Attach superseded")]
    Superseded,
}

pub type Result<T> = std::result::Result<T, AttachError>;
