//! Type definitions for the compression domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;
use crate::errors::{CompressionError, ErrorDetail, ErrorKind, JobResult};

/// Quality levels offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    /// Keep the original file, nothing is dispatched to the tool
    NoCompression,

    /// Maximum compression, average quality
    High,

    /// Balance between quality and size
    #[default]
    Medium,

    /// Minimal compression, best quality
    Low,
}

impl QualityLevel {
    pub fn all() -> [QualityLevel; 4] {
        [
            QualityLevel::Medium,
            QualityLevel::NoCompression,
            QualityLevel::High,
            QualityLevel::Low,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::NoCompression => "none",
            QualityLevel::High => "high",
            QualityLevel::Medium => "medium",
            QualityLevel::Low => "low",
        }
    }

    /// Label as shown in the compression level picker
    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::NoCompression => "No Compression",
            QualityLevel::High => "High (average quality)",
            QualityLevel::Medium => "Medium (good quality)",
            QualityLevel::Low => "Low (best quality)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityLevel::NoCompression => "original quality",
            QualityLevel::High => "maximum compression and smaller size",
            QualityLevel::Medium => "a balance between quality and size",
            QualityLevel::Low => "minimal compression and higher quality",
        }
    }

    /// Tool preset for this level; `None` means the level is never dispatched.
    pub fn preset(&self) -> Option<PdfPreset> {
        match self {
            QualityLevel::NoCompression => None,
            QualityLevel::High => Some(PdfPreset::Screen),
            QualityLevel::Medium => Some(PdfPreset::Ebook),
            QualityLevel::Low => Some(PdfPreset::Printer),
        }
    }
}

impl FromStr for QualityLevel {
    type Err = CompressionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "no_compression" | "no compression" | "no-compression" => Ok(QualityLevel::NoCompression),
            "high" | "high (average quality)" => Ok(QualityLevel::High),
            "medium" | "medium (good quality)" => Ok(QualityLevel::Medium),
            "low" | "low (best quality)" => Ok(QualityLevel::Low),
            _ => Err(CompressionError::UnsupportedQuality(s.to_string())),
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ghostscript `-dPDFSETTINGS` presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfPreset {
    /// ~72 dpi images
    Screen,
    /// ~150 dpi images
    Ebook,
    /// ~300 dpi images
    Printer,
}

impl PdfPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfPreset::Screen => "screen",
            PdfPreset::Ebook => "ebook",
            PdfPreset::Printer => "printer",
        }
    }

    /// Argument passed on the tool command line
    pub fn settings_arg(&self) -> String {
        format!("-dPDFSETTINGS=/{}", self.as_str())
    }
}

// Default in-memory limit matches the upload limit of the form: 2GB.
const DEFAULT_MAX_INPUT_BYTES: u64 = 2048 * 1024 * 1024;

/// Configuration for compression jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub ghostscript_path: String,
    pub work_dir: Option<PathBuf>, // Root for per-job temp directories
    pub timeout_secs: Option<u64>,
    pub max_input_bytes: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            ghostscript_path: "gs".to_string(),
            work_dir: None,
            timeout_secs: None,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl CompressionConfig {
    /// Build a configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        if let Ok(path) = env::var("GHOSTSCRIPT_PATH") {
            if !path.trim().is_empty() {
                config.ghostscript_path = path;
            }
        }

        if let Ok(dir) = env::var("PDF_COMPRESS_WORK_DIR") {
            if !dir.trim().is_empty() {
                config.work_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(secs) = parse_env_number("PDF_COMPRESS_TIMEOUT_SECS") {
            config.timeout_secs = (secs > 0).then_some(secs);
        }

        if let Some(limit) = parse_env_number("MAX_IN_MEMORY_COMPRESSION_BYTES") {
            config.max_input_bytes = limit;
        }

        config
    }

    /// Tool timeout; `0` means no timeout, wherever the value came from.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

fn parse_env_number(name: &str) -> Option<u64> {
    let value = env::var(name).ok()?;
    match value.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a non-negative integer", name, value);
            None
        }
    }
}

/// One compress-one-file request
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    pub data: Vec<u8>,
    pub quality: QualityLevel,
    pub filename: String,
}

impl CompressionRequest {
    pub fn new(data: Vec<u8>, quality: QualityLevel, filename: impl Into<String>) -> Self {
        Self {
            data,
            quality,
            filename: filename.into(),
        }
    }

    pub fn output_filename(&self) -> String {
        output_filename(&self.filename)
    }
}

/// Name offered for the compressed download: `compressed_<basename>`
pub fn output_filename(original: &str) -> String {
    let base = Path::new(original.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("document.pdf");
    format!("compressed_{}", base)
}

/// Percentage by which `compressed` is smaller than `original`.
///
/// Negative when the tool produced a larger file. A zero-byte original is rejected.
pub fn reduction_percentage(original: u64, compressed: u64) -> JobResult<f64> {
    if original == 0 {
        return Err(CompressionError::EmptyInput);
    }
    Ok((original as f64 - compressed as f64) / original as f64 * 100.0)
}

/// Size in MB with two decimals, e.g. `"9.54 MB"`
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Skipped,
    Failed,
}

/// Result from a compression job
#[derive(Debug, Clone, Serialize)]
pub struct CompressionResult {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub success: bool,
    #[serde(skip)]
    pub output: Option<Vec<u8>>,
    pub output_filename: String,
    pub content_type: String,
    pub quality: QualityLevel,
    pub preset_used: Option<PdfPreset>,
    pub original_size: u64,
    pub compressed_size: u64,
    pub space_saved_bytes: i64,
    pub reduction_percentage: Option<f64>,
    pub error: Option<ErrorDetail>,
    pub duration_ms: i64,
    pub completed_at: DateTime<Utc>,
}

impl CompressionResult {
    fn base(job_id: Uuid, request: &CompressionRequest, duration_ms: i64) -> Self {
        Self {
            job_id,
            status: JobStatus::Failed,
            success: false,
            output: None,
            output_filename: request.output_filename(),
            content_type: mime::APPLICATION_PDF.to_string(),
            quality: request.quality,
            preset_used: request.quality.preset(),
            original_size: request.data.len() as u64,
            compressed_size: 0,
            space_saved_bytes: 0,
            reduction_percentage: None,
            error: None,
            duration_ms,
            completed_at: Utc::now(),
        }
    }

    pub(crate) fn completed(
        job_id: Uuid,
        request: &CompressionRequest,
        output: Vec<u8>,
        duration_ms: i64,
    ) -> JobResult<Self> {
        let mut result = Self::base(job_id, request, duration_ms);
        let compressed_size = output.len() as u64;
        result.reduction_percentage = Some(reduction_percentage(result.original_size, compressed_size)?);
        result.status = JobStatus::Completed;
        result.success = true;
        result.compressed_size = compressed_size;
        result.space_saved_bytes = result.original_size as i64 - compressed_size as i64;
        result.output = Some(output);
        Ok(result)
    }

    pub(crate) fn failed(
        job_id: Uuid,
        request: &CompressionRequest,
        error: &CompressionError,
        duration_ms: i64,
    ) -> Self {
        let mut result = Self::base(job_id, request, duration_ms);
        if error.kind() == ErrorKind::SkippedNoCompression {
            result.status = JobStatus::Skipped;
        }
        result.error = Some(ErrorDetail::from(error));
        result
    }

    pub fn is_skipped(&self) -> bool {
        self.status == JobStatus::Skipped
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Take the output bytes, leaving the metrics in place
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.output.take()
    }

    pub fn summary(&self) -> String {
        match (&self.status, self.reduction_percentage, &self.error) {
            (JobStatus::Completed, Some(pct), _) => format!("Done! File compressed by {:.1}%", pct),
            (_, _, Some(detail)) => detail.message.clone(),
            _ => "Compression finished without a result".to_string(),
        }
    }
}
