// Declare submodules for the compression domain
pub mod types;
pub mod compressors;
pub mod job;

// Re-export key types
pub use types::{
    CompressionConfig, CompressionRequest, CompressionResult, JobStatus,
    PdfPreset, QualityLevel,
    format_megabytes, output_filename, reduction_percentage,
};

pub use compressors::{Compressor, GhostscriptCompressor};
pub use job::CompressionJob;
