mod error;

pub use error::{CompressionError, ErrorDetail, ErrorKind};

/// Result type for compression job operations
pub type JobResult<T> = Result<T, CompressionError>;
