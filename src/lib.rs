// Public modules
pub mod domains;
pub mod errors;
pub mod ffi;
pub mod globals;

pub use domains::compression::{
    CompressionConfig, CompressionJob, CompressionRequest, CompressionResult, Compressor,
    GhostscriptCompressor, PdfPreset, QualityLevel,
};
pub use errors::{CompressionError, ErrorKind};

// Entry point for initialization
/// Initialize logging and the global compression job used by the FFI layer.
/// Pass `None` to read the configuration from the environment (and `.env`).
pub fn initialize(config: Option<CompressionConfig>) -> ffi::FFIResult<()> {
    globals::initialize(config)
}

/// Check if the library has been initialized
pub fn is_initialized() -> bool {
    globals::is_initialized()
}
