//! Matroska-specific error types.

use thiserror::Error;

/// Matroska muxing error types.
#[derive(Error, Debug)]
pub enum MkvError {
    /// A reserved seek head ran out of entry slots.
    #[error("Seek head full: reserved space holds at most {capacity} entries")]
    SeekHeadFull {
        /// Number of entries the reservation was sized for.
        capacity: usize,
    },

    /// Codec initialization data could not be shaped into CodecPrivate.
    #[error("Invalid codec data for stream {stream}: {message}")]
    InvalidCodecData {
        /// Index of the offending stream.
        stream: u32,
        /// Description of the problem.
        message: String,
    },

    /// No Matroska codec ID and no RIFF tag exists for the codec.
    #[error("No codec tag found for stream {stream}")]
    UnsupportedCodec {
        /// Index of the offending stream.
        stream: u32,
    },

    /// The stream kind cannot be represented as a Matroska track.
    #[error("Unsupported track type for stream {stream}")]
    UnsupportedTrackType {
        /// Index of the offending stream.
        stream: u32,
    },

    /// A packet referenced a stream that was never configured.
    #[error("Stream {index} not found")]
    StreamNotFound {
        /// The missing stream index.
        index: u32,
    },

    /// Muxer phase methods called out of order.
    #[error("Invalid muxer state: {0}")]
    InvalidState(String),

    /// I/O error from the byte sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl From<String> for MkvError {
    fn from(s: String) -> Self {
        MkvError::Other(s)
    }
}

impl From<&str> for MkvError {
    fn from(s: &str) -> Self {
        MkvError::Other(s.to_string())
    }
}

/// Result type for Matroska operations.
pub type Result<T> = std::result::Result<T, MkvError>;

/// Convert MkvError to remux_core::Error.
impl From<MkvError> for remux_core::Error {
    fn from(err: MkvError) -> Self {
        use remux_core::error::ContainerError;
        match err {
            MkvError::Io(e) => remux_core::Error::Io(e),
            MkvError::SeekHeadFull { capacity } => remux_core::Error::ResourceExhausted(
                format!("seek head reserved for {capacity} entries"),
            ),
            MkvError::UnsupportedCodec { stream } => {
                remux_core::Error::Unsupported(format!("codec of stream {stream}"))
            }
            MkvError::UnsupportedTrackType { stream } => {
                remux_core::Error::Unsupported(format!("track type of stream {stream}"))
            }
            MkvError::InvalidCodecData { stream, message } => remux_core::Error::Container(
                ContainerError::TrackConfig(format!("stream {stream}: {message}")),
            ),
            MkvError::StreamNotFound { index } => {
                remux_core::Error::Container(ContainerError::StreamNotFound { index })
            }
            _ => remux_core::Error::Container(ContainerError::Other(err.to_string())),
        }
    }
}
