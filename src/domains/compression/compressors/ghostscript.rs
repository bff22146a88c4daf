//! PDF compression through the Ghostscript command line

use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::errors::{CompressionError, JobResult};
use super::Compressor;
use crate::domains::compression::types::{CompressionConfig, PdfPreset};

/// PDF compatibility level written by the pdfwrite device
pub const COMPATIBILITY_LEVEL: &str = "1.4";

/// PDF compressor using an external Ghostscript binary (gs)
#[derive(Debug, Clone)]
pub struct GhostscriptCompressor {
    ghostscript_path: String,
    timeout: Option<Duration>,
}

impl GhostscriptCompressor {
    pub fn new(ghostscript_path: Option<String>) -> Self {
        Self {
            ghostscript_path: ghostscript_path.unwrap_or_else(|| "gs".to_string()),
            timeout: None,
        }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        Self::new(Some(config.ghostscript_path.clone())).with_timeout(config.timeout())
    }

    /// Kill the tool and fail the job if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.ghostscript_path
    }

    /// Full argument list for one invocation; the staged input is always last.
    pub fn build_args(input: &Path, output: &Path, preset: PdfPreset) -> Vec<OsString> {
        let mut output_arg = OsString::from("-sOutputFile=");
        output_arg.push(output);

        vec![
            OsString::from("-sDEVICE=pdfwrite"),
            OsString::from(format!("-dCompatibilityLevel={}", COMPATIBILITY_LEVEL)),
            OsString::from(preset.settings_arg()),
            OsString::from("-dNOPAUSE"),
            OsString::from("-dQUIET"),
            OsString::from("-dBATCH"),
            output_arg,
            input.as_os_str().to_os_string(),
        ]
    }

    fn spawn_error(&self, error: io::Error) -> CompressionError {
        if error.kind() == io::ErrorKind::NotFound {
            CompressionError::ToolNotFound {
                program: self.ghostscript_path.clone(),
            }
        } else {
            CompressionError::launch_failed(&self.ghostscript_path, &error)
        }
    }

    async fn run_tool(&self, args: Vec<OsString>) -> JobResult<Output> {
        let child = Command::new(&self.ghostscript_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let waiting = child.wait_with_output();
        let finished = match self.timeout {
            // Dropping the future on expiry kills the child.
            Some(limit) => tokio::time::timeout(limit, waiting).await.map_err(|_| {
                log::error!("{} exceeded {:?}, killed", self.ghostscript_path, limit);
                CompressionError::ToolTimedOut { seconds: limit.as_secs() }
            })?,
            None => waiting.await,
        };

        finished.map_err(|e| CompressionError::launch_failed(&self.ghostscript_path, &e))
    }
}

impl Default for GhostscriptCompressor {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Ghostscript reports most errors on stdout, so fall back to it.
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    text.trim().to_string()
}

#[async_trait]
impl Compressor for GhostscriptCompressor {
    async fn compress(&self, input: &Path, output: &Path, preset: PdfPreset) -> JobResult<()> {
        let args = Self::build_args(input, output, preset);
        log::debug!("Running {} {:?}", self.ghostscript_path, args);

        let result = self.run_tool(args).await?;

        if !result.status.success() {
            let error = CompressionError::ToolInvocationFailed {
                status: result.status.code(),
                stderr: diagnostics(&result),
            };
            log::error!("Ghostscript error: {}", error);
            return Err(error);
        }

        Ok(())
    }

    async fn probe(&self) -> JobResult<String> {
        let result = self.run_tool(vec![OsString::from("--version")]).await?;

        if !result.status.success() {
            return Err(CompressionError::ToolInvocationFailed {
                status: result.status.code(),
                stderr: diagnostics(&result),
            });
        }

        Ok(String::from_utf8_lossy(&result.stdout).trim().to_string())
    }

    fn compressor_name(&self) -> &'static str {
        "GhostscriptCompressor"
    }
}
