//! Error types for the remux library.

use thiserror::Error;

/// Main error type for the remux library.
#[derive(Error, Debug)]
pub enum Error {
    /// Container format errors (muxing).
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unsupported feature or format.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Resource exhausted (reserved space, entry lists, etc.).
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

/// Container format errors.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Invalid or inconsistent container structure.
    #[error("Invalid container structure: {0}")]
    InvalidStructure(String),

    /// Missing required element.
    #[error("Missing required element: {0}")]
    MissingElement(String),

    /// Stream not found in container.
    #[error("Stream {index} not found")]
    StreamNotFound { index: u32 },

    /// Track configuration error.
    #[error("Track configuration error: {0}")]
    TrackConfig(String),

    /// Seek operation failed.
    #[error("Seek failed: {0}")]
    SeekFailed(String),

    /// Generic container error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for ContainerError {
    fn from(s: String) -> Self {
        ContainerError::Other(s)
    }
}

impl From<&str> for ContainerError {
    fn from(s: &str) -> Self {
        ContainerError::Other(s.to_string())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("test parameter".into());
        assert_eq!(err.to_string(), "Invalid parameter: test parameter");
    }

    #[test]
    fn test_container_error_conversion() {
        let container_err = ContainerError::StreamNotFound { index: 3 };
        let err: Error = container_err.into();
        assert!(matches!(
            err,
            Error::Container(ContainerError::StreamNotFound { index: 3 })
        ));
    }
}
