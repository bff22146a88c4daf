use crate::domains::compression::{CompressionConfig, CompressionJob};
use crate::ffi::error::{FFIError, FFIResult};
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: Mutex<()> = Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    static ref COMPRESSION_JOB: Mutex<Option<Arc<CompressionJob>>> = Mutex::new(None);
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

pub fn get_compression_job() -> FFIResult<Arc<CompressionJob>> {
    COMPRESSION_JOB
        .lock()
        .map_err(|_| FFIError::internal("COMPRESSION_JOB lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::not_initialized("CompressionJob"))
}

/// Install the Ghostscript-backed job. Later calls replace the configuration.
pub fn initialize(config: Option<CompressionConfig>) -> FFIResult<()> {
    let _guard = INIT_MUTEX
        .lock()
        .map_err(|_| FFIError::internal("INIT_MUTEX lock poisoned".to_string()))?;

    initialize_logging();

    let config = config.unwrap_or_else(CompressionConfig::from_env);
    log::info!("Initializing compression job");
    log::debug!("Ghostscript path: {}", config.ghostscript_path);
    log::debug!("Work dir: {:?}", config.work_dir);
    log::debug!("Timeout: {:?}", config.timeout_secs);

    install_job(CompressionJob::with_ghostscript(config))
}

/// Replace the global job (also used to inject a custom `Compressor`).
pub fn install_job(job: CompressionJob) -> FFIResult<()> {
    let mut slot = COMPRESSION_JOB
        .lock()
        .map_err(|_| FFIError::internal("COMPRESSION_JOB lock poisoned".to_string()))?;
    *slot = Some(Arc::new(job));
    INITIALIZED.store(true, Ordering::Release);
    Ok(())
}

fn initialize_logging() {
    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        std::env::set_var("RUST_LOG", "debug");
        #[cfg(not(debug_assertions))]
        std::env::set_var("RUST_LOG", "info");
    }

    // Initialize env_logger if not already initialized
    let _ = env_logger::try_init();
}
