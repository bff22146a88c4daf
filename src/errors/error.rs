use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable classification of a job outcome that did not produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnsupportedQuality,
    EmptyInput,
    InputTooLarge,
    WorkingArea,
    ToolNotFound,
    ToolInvocationFailed,
    ToolTimedOut,
    EmptyOutput,
    SkippedNoCompression,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedQuality => "UNSUPPORTED_QUALITY",
            ErrorKind::EmptyInput => "EMPTY_INPUT",
            ErrorKind::InputTooLarge => "INPUT_TOO_LARGE",
            ErrorKind::WorkingArea => "WORKING_AREA",
            ErrorKind::ToolNotFound => "TOOL_NOT_FOUND",
            ErrorKind::ToolInvocationFailed => "TOOL_INVOCATION_FAILED",
            ErrorKind::ToolTimedOut => "TOOL_TIMED_OUT",
            ErrorKind::EmptyOutput => "EMPTY_OUTPUT",
            ErrorKind::SkippedNoCompression => "SKIPPED_NO_COMPRESSION",
        }
    }
}

/// Compression job errors
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum CompressionError {
    #[error("Unsupported quality level: {0}")]
    UnsupportedQuality(String),

    #[error("Input is empty, nothing to compress")]
    EmptyInput,

    #[error("Input of {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge {
        size: u64,
        limit: u64,
    },

    #[error("Working area error: {0}")]
    WorkingArea(String),

    #[error("Compression tool '{program}' was not found")]
    ToolNotFound {
        program: String,
    },

    #[error("Compression tool failed ({}): {stderr}", .status.map_or_else(|| "no exit code".to_string(), |c| format!("exit code {}", c)))]
    ToolInvocationFailed {
        status: Option<i32>,
        stderr: String,
    },

    #[error("Compression tool did not finish within {seconds}s")]
    ToolTimedOut {
        seconds: u64,
    },

    #[error("Compression tool exited successfully but produced no output")]
    EmptyOutput,

    #[error("No compression selected. Please select a level to compress.")]
    SkippedNoCompression,
}

impl CompressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompressionError::UnsupportedQuality(_) => ErrorKind::UnsupportedQuality,
            CompressionError::EmptyInput => ErrorKind::EmptyInput,
            CompressionError::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            CompressionError::WorkingArea(_) => ErrorKind::WorkingArea,
            CompressionError::ToolNotFound { .. } => ErrorKind::ToolNotFound,
            CompressionError::ToolInvocationFailed { .. } => ErrorKind::ToolInvocationFailed,
            CompressionError::ToolTimedOut { .. } => ErrorKind::ToolTimedOut,
            CompressionError::EmptyOutput => ErrorKind::EmptyOutput,
            CompressionError::SkippedNoCompression => ErrorKind::SkippedNoCompression,
        }
    }

    /// Launch failure that is not a missing binary (permissions, bad format, ...)
    pub fn launch_failed(program: &str, error: &std::io::Error) -> Self {
        Self::ToolInvocationFailed {
            status: None,
            stderr: format!("Failed to launch '{}': {}", program, error),
        }
    }

    pub fn working_area(context: &str, error: &std::io::Error) -> Self {
        Self::WorkingArea(format!("{}: {}", context, error))
    }
}

/// Serializable error detail carried by a job result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CompressionError> for ErrorDetail {
    fn from(error: &CompressionError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
