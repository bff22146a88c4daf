// Content for src/ffi/error.rs
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::errors::{CompressionError, ErrorKind};

/// Error codes for FFI boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Success (no error)
    Success = 0,

    // General errors (1-99)
    Unknown = 1,
    InvalidArgument = 2,
    NullPointer = 3,
    InvalidUtf8 = 4,
    InternalError = 6,
    NotInitialized = 7,

    // Compression errors (200-299)
    UnsupportedQuality = 200,
    EmptyInput = 201,
    InputTooLarge = 202,
    WorkingAreaError = 203,
    ToolNotFound = 204,
    ToolInvocationFailed = 205,
    ToolTimedOut = 206,
    EmptyOutput = 207,
    SkippedNoCompression = 208,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Error type for FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FFIError {
    /// Error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    pub details: Option<String>,
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for FFIError {}

impl FFIError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: &str, details: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    // Helper for internal errors
    pub fn internal(message: String) -> Self {
        Self::new(ErrorCode::InternalError, &message)
    }

    pub fn not_initialized(what: &str) -> Self {
        Self::new(ErrorCode::NotInitialized, &format!("{} not initialized", what))
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::UnsupportedQuality => ErrorCode::UnsupportedQuality,
            ErrorKind::EmptyInput => ErrorCode::EmptyInput,
            ErrorKind::InputTooLarge => ErrorCode::InputTooLarge,
            ErrorKind::WorkingArea => ErrorCode::WorkingAreaError,
            ErrorKind::ToolNotFound => ErrorCode::ToolNotFound,
            ErrorKind::ToolInvocationFailed => ErrorCode::ToolInvocationFailed,
            ErrorKind::ToolTimedOut => ErrorCode::ToolTimedOut,
            ErrorKind::EmptyOutput => ErrorCode::EmptyOutput,
            ErrorKind::SkippedNoCompression => ErrorCode::SkippedNoCompression,
        }
    }
}

impl From<CompressionError> for FFIError {
    fn from(err: CompressionError) -> Self {
        let code = ErrorCode::from(err.kind());
        let message = err.to_string();
        match err {
            CompressionError::UnsupportedQuality(quality) => Self::with_details(
                code,
                &message,
                &format!("Quality must be none, high, medium or low (got: {:?})", quality),
            ),
            CompressionError::ToolNotFound { program } => Self::with_details(
                code,
                &message,
                &format!("Install Ghostscript or point GHOSTSCRIPT_PATH at it (tried '{}')", program),
            ),
            CompressionError::ToolInvocationFailed { stderr, .. } => Self::with_details(code, &message, &stderr),
            _ => Self::new(code, &message),
        }
    }
}

pub type FFIResult<T> = Result<T, FFIError>;
