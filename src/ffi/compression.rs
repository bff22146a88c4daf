// src/ffi/compression.rs
// =============================================================================
// COMPRESSION – FFI BINDINGS
// =============================================================================
// This module exposes `CompressionJob` to native callers.
// All functions follow the same conventions: JSON payloads, explicit
// success/error codes, and manual memory management for returned strings.
//
// MEMORY OWNERSHIP:
// - The caller owns input JSON strings (read-only in Rust)
// - Rust owns output strings (the caller must call compression_free)
// - All strings are UTF-8, null-terminated
//
// JSON CONTRACTS:
// - compress_pdf: {"data_base64": "...", "quality": "none|high|medium|low", "filename": "name.pdf"}
//   -> CompressionResult JSON plus "output_base64" (null unless status is COMPLETED)
// - check_tool: -> {"available": bool, "program": "gs", "version": "10.02.1"?, "error": FFIError?}
//
// RETURN CODES:
// - 0 when the job completed; otherwise the ErrorCode of the failure. A job
//   failure (including the no-compression skip) still writes the full result JSON.
// -----------------------------------------------------------------------------

use crate::ffi::{parse_json_input, write_json_result, FFIResult};
use crate::ffi::error::{FFIError, ErrorCode};
use crate::globals;
use crate::domains::compression::{CompressionRequest, CompressionResult, QualityLevel};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::os::raw::{c_char, c_int};

// -----------------------------------------------------------------------------
// DTO Types -------------------------------------------------------------------
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct CompressPdfRequest {
    data_base64: String,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Serialize)]
struct CompressPdfResponse {
    #[serde(flatten)]
    result: CompressionResult,
    output_base64: Option<String>,
}

#[derive(Serialize)]
struct ToolStatusResponse {
    available: bool,
    program: String,
    version: Option<String>,
    error: Option<FFIError>,
}

fn build_request(payload: CompressPdfRequest) -> FFIResult<CompressionRequest> {
    let data = STANDARD.decode(payload.data_base64.trim()).map_err(|e| {
        FFIError::with_details(ErrorCode::InvalidArgument, "Invalid data_base64", &e.to_string())
    })?;

    let quality = match payload.quality.as_deref() {
        Some(q) => q.parse::<QualityLevel>()?,
        None => QualityLevel::default(),
    };

    Ok(CompressionRequest::new(data, quality, payload.filename.unwrap_or_default()))
}

fn compress_payload(payload: CompressPdfRequest) -> FFIResult<(ErrorCode, CompressPdfResponse)> {
    let request = build_request(payload)?;
    let job = globals::get_compression_job()?;

    let mut result = job.run_blocking(request)?;
    let code = result.error_kind().map_or(ErrorCode::Success, ErrorCode::from);
    let output_base64 = result.take_output().map(|bytes| STANDARD.encode(bytes));

    Ok((code, CompressPdfResponse { result, output_base64 }))
}

// -----------------------------------------------------------------------------
// FFI Functions ----------------------------------------------------------------
// -----------------------------------------------------------------------------

/// Compress one PDF
/// Input: {"data_base64": "...", "quality": "high", "filename": "report.pdf"}
/// Output: CompressionResult JSON with "output_base64"
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_compress_pdf(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    unsafe {
        write_json_result(result, || {
            let payload: CompressPdfRequest = parse_json_input(payload_json)?;
            compress_payload(payload)
        })
    }
}

/// Check whether the configured tool can be launched
/// Output: {"available": bool, "program": "...", "version": "..."?, "error": FFIError?}
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_check_tool(result: *mut *mut c_char) -> c_int {
    unsafe {
        write_json_result(result, || {
            let job = globals::get_compression_job()?;
            let program = job.config().ghostscript_path.clone();

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| FFIError::with_details(ErrorCode::InternalError, "Failed to create async runtime", &e.to_string()))?;

            let status = match rt.block_on(job.compressor().probe()) {
                Ok(version) => (ErrorCode::Success, ToolStatusResponse { available: true, program, version: Some(version), error: None }),
                Err(e) => {
                    let error = FFIError::from(e);
                    (error.code, ToolStatusResponse { available: false, program, version: None, error: Some(error) })
                }
            };
            Ok(status)
        })
    }
}
