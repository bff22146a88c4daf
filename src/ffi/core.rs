// src/ffi/core.rs
// ============================================================================
// Core FFI functions for library initialization and memory management
// ============================================================================

use crate::domains::compression::CompressionConfig;
use crate::ffi::{handle_status_result, parse_json_input, error::FFIError};
use std::ffi::{c_char, CString};
use std::os::raw::c_int;

/// Initialize logging and the global compression job.
/// `config_json` may be null to read the configuration from the environment.
/// Returns 0 on success, non-zero on error
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pdf_compressor_initialize(config_json: *const c_char) -> c_int {
    let result = std::panic::catch_unwind(|| {
        let config = if config_json.is_null() {
            None
        } else {
            Some(parse_json_input::<CompressionConfig>(config_json)?)
        };
        crate::globals::initialize(config)
    });

    match result {
        Ok(ffi_result) => handle_status_result(|| ffi_result),
        Err(panic_payload) => {
            let panic_msg = if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Panicked during FFI call, but panic message is not a string".to_string()
            };
            handle_status_result(|| Err(FFIError::internal(format!("Panic during initialization: {}", panic_msg))))
        }
    }
}

/// Free a string returned by any function in this library.
/// Call exactly once per returned pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe { let _ = CString::from_raw(ptr); }
    }
}
