//! Error taxonomy shared by every engine operation.
//!
//! All fallible engine calls return [`Result`]. Failure is explicit status
//! passing; the engine never panics for control flow.

/// Engine-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A required input was null/empty or otherwise malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A numeric value fell outside its declared bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A referenced configuration, test, tag, or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An input file is missing or has zero length.
    #[error("empty or missing file: {0}")]
    EmptyOrMissingFile(String),

    /// A bitstream chunk did not match the required buffer size.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A count identity (e.g. actualPass + actualFail == actualTestCount)
    /// does not hold.
    #[error("validation failure: {0}")]
    ValidationFailure(String),

    /// JSON text could not be parsed.
    #[error("json parse failure: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A JSON document parsed but does not have the expected shape.
    #[error("json operation failure: {0}")]
    JsonOperation(String),

    /// An OS call failed; wraps the errno-carrying error.
    #[error("system call failure: {0}")]
    SystemCall(#[from] std::io::Error),
}

/// Engine-wide result alias.
pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
    /// True when the error represents an expected "file not there yet"
    /// condition a caller may recover from locally.
    pub fn is_missing_file(&self) -> bool {
        match self {
            Self::EmptyOrMissingFile(_) => true,
            Self::SystemCall(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
