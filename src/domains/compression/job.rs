//! Single-request compression pipeline: stage, invoke, verify, clean up.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use uuid::Uuid;

use crate::errors::{CompressionError, JobResult};
use super::compressors::{looks_like_pdf, Compressor, GhostscriptCompressor};
use super::types::{CompressionConfig, CompressionRequest, CompressionResult, PdfPreset, QualityLevel};

const STAGED_INPUT_NAME: &str = "input.pdf";
const OUTPUT_NAME: &str = "output.pdf";

/// Runs compress-one-file requests against a `Compressor`.
///
/// Holds no per-request state; one instance can serve concurrent calls because
/// every call stages its files in its own freshly created directory.
#[derive(Clone)]
pub struct CompressionJob {
    compressor: Arc<dyn Compressor>,
    config: CompressionConfig,
}

impl CompressionJob {
    pub fn new(compressor: Arc<dyn Compressor>, config: CompressionConfig) -> Self {
        Self { compressor, config }
    }

    /// Job backed by Ghostscript as described by `config`
    pub fn with_ghostscript(config: CompressionConfig) -> Self {
        let compressor = GhostscriptCompressor::from_config(&config);
        Self::new(Arc::new(compressor), config)
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn compressor(&self) -> Arc<dyn Compressor> {
        self.compressor.clone()
    }

    /// Compress one file. Never fails outright: every outcome, including the
    /// no-compression skip, is reported in the returned result.
    pub async fn run(&self, request: CompressionRequest) -> CompressionResult {
        let job_id = Uuid::new_v4();
        let start_time = Instant::now();

        log::info!(
            "Starting compression job {} for '{}' ({} bytes, quality: {})",
            job_id,
            request.filename,
            request.data.len(),
            request.quality.as_str()
        );

        let outcome = self.execute(job_id, &request).await;
        let duration_ms = start_time.elapsed().as_millis() as i64;

        let result = match outcome {
            Ok(output) => CompressionResult::completed(job_id, &request, output, duration_ms)
                .unwrap_or_else(|e| CompressionResult::failed(job_id, &request, &e, duration_ms)),
            Err(e) => CompressionResult::failed(job_id, &request, &e, duration_ms),
        };

        match &result.error {
            None => log::info!(
                "Compression job {} completed in {}ms: {} -> {} bytes",
                job_id,
                duration_ms,
                result.original_size,
                result.compressed_size
            ),
            Some(detail) if result.is_skipped() => log::info!("Compression job {} skipped: {}", job_id, detail.message),
            Some(detail) => log::warn!("Compression job {} failed after {}ms: {}", job_id, duration_ms, detail.message),
        }

        result
    }

    /// Convenience wrapper over `run` for callers without a request value
    pub async fn compress(&self, data: Vec<u8>, quality: QualityLevel, filename: &str) -> CompressionResult {
        self.run(CompressionRequest::new(data, quality, filename)).await
    }

    /// Blocking variant of `run` for synchronous callers outside a runtime.
    pub fn run_blocking(&self, request: CompressionRequest) -> JobResult<CompressionResult> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CompressionError::working_area("Failed to create async runtime", &e))?;
        Ok(rt.block_on(self.run(request)))
    }

    async fn execute(&self, job_id: Uuid, request: &CompressionRequest) -> JobResult<Vec<u8>> {
        let preset = match request.quality.preset() {
            Some(preset) => preset,
            None => return Err(CompressionError::SkippedNoCompression),
        };

        self.validate_input(&request.data)?;

        let work_area = self.create_work_area(job_id)?;
        let outcome = self.compress_in(work_area.path(), &request.data, preset).await;

        // Explicit close so a failed cleanup is at least visible in the log.
        let work_path = work_area.path().to_path_buf();
        if let Err(e) = work_area.close() {
            log::warn!("Failed to remove working area {}: {}", work_path.display(), e);
        }

        outcome
    }

    fn validate_input(&self, data: &[u8]) -> JobResult<()> {
        if data.is_empty() {
            return Err(CompressionError::EmptyInput);
        }

        let size = data.len() as u64;
        if size > self.config.max_input_bytes {
            return Err(CompressionError::InputTooLarge {
                size,
                limit: self.config.max_input_bytes,
            });
        }

        if !looks_like_pdf(data) {
            log::warn!("Input does not start with a PDF signature, passing it to the tool anyway");
        }

        Ok(())
    }

    fn create_work_area(&self, job_id: Uuid) -> JobResult<TempDir> {
        let root = self.work_root();
        let prefix = format!("pdf-compress-{}-", job_id.simple());

        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&root)
            .map_err(|e| CompressionError::working_area(&format!("Failed to create working area in {}", root.display()), &e))?;

        log::debug!("Job {} working area: {}", job_id, dir.path().display());
        Ok(dir)
    }

    fn work_root(&self) -> PathBuf {
        self.config.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    async fn compress_in(&self, work_dir: &Path, data: &[u8], preset: PdfPreset) -> JobResult<Vec<u8>> {
        let input_path = work_dir.join(STAGED_INPUT_NAME);
        let output_path = work_dir.join(OUTPUT_NAME);

        tokio::fs::write(&input_path, data)
            .await
            .map_err(|e| CompressionError::working_area("Failed to stage input", &e))?;

        log::debug!(
            "Dispatching to {} with preset {}",
            self.compressor.compressor_name(),
            preset.as_str()
        );
        self.compressor.compress(&input_path, &output_path, preset).await?;

        let output = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(CompressionError::EmptyOutput),
            Err(e) => return Err(CompressionError::working_area("Failed to read compressed output", &e)),
        };

        if output.is_empty() {
            return Err(CompressionError::EmptyOutput);
        }

        Ok(output)
    }
}
