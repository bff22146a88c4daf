//! Compressors the job can dispatch staged files to

pub mod ghostscript;

use async_trait::async_trait;
use std::path::Path;
use crate::errors::JobResult;
use super::types::PdfPreset;

pub use ghostscript::GhostscriptCompressor;

/// A process-spawning (or library-backed) PDF compressor
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Rewrite the PDF at `input` into `output` using the given preset.
    ///
    /// Both paths live inside the job's working area. Returning `Ok` does not
    /// guarantee `output` exists; the job verifies that separately.
    async fn compress(&self, input: &Path, output: &Path, preset: PdfPreset) -> JobResult<()>;

    /// Check that the underlying tool can be launched, returning its version
    async fn probe(&self) -> JobResult<String>;

    /// Get the compressor type name for logging
    fn compressor_name(&self) -> &'static str;
}

/// Whether the bytes carry a PDF signature
pub fn looks_like_pdf(data: &[u8]) -> bool {
    infer::get(data).map_or(false, |kind| kind.mime_type() == mime::APPLICATION_PDF.essence_str())
}
