// In src/ffi/mod.rs
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use crate::ffi::error::{FFIError, ErrorCode};
use serde::{Deserialize, Serialize};

// Declare necessary FFI submodules
pub mod error;
pub mod core;
pub mod compression;

/// Error handling helper for FFI boundaries (returns error code)
pub fn handle_status_result<F>(func: F) -> c_int
where
    F: FnOnce() -> FFIResult<()>,
{
    match func() {
        Ok(_) => ErrorCode::Success as c_int,
        Err(e) => {
            log::error!("[FFI] Code: {:?}, Message: {}, Details: {:?}",
                        e.code, e.message, e.details.as_deref().unwrap_or("None"));
            e.code as c_int
        }
    }
}

/// Serializes `value` to a C string owned by the caller (free with `compression_free`).
/// Serialization failures are themselves reported as FFIError JSON so the caller can always parse the response.
pub fn to_json_ptr<T: Serialize>(value: &T) -> *mut c_char {
    let json = serde_json::to_string(value).unwrap_or_else(|e| {
        let error_msg = format!("Failed to serialize result: {}", e);
        log::error!("[FFI] {}", error_msg);
        serde_json::json!({"code": ErrorCode::InternalError, "message": error_msg, "details": null}).to_string()
    });

    match CString::new(json) {
        Ok(c_string) => c_string.into_raw(),
        Err(e) => {
            log::error!("[FFI] Failed to create CString: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Runs `func`, writes either its value or the FFIError as JSON into `result`,
/// and returns the code the caller should branch on.
///
/// # Safety
/// `result` must be null or valid for a pointer write.
pub unsafe fn write_json_result<F, T>(result: *mut *mut c_char, func: F) -> c_int
where
    F: FnOnce() -> FFIResult<(ErrorCode, T)>,
    T: Serialize,
{
    let (code, json_ptr) = match func() {
        Ok((code, value)) => (code, to_json_ptr(&value)),
        Err(ffi_error) => {
            log::error!("[FFI] {}", ffi_error);
            (ffi_error.code, to_json_ptr(&ffi_error))
        }
    };

    if result.is_null() {
        // Nobody to hand the string to
        if !json_ptr.is_null() {
            unsafe { drop(CString::from_raw(json_ptr)); }
        }
        return ErrorCode::NullPointer as c_int;
    }

    unsafe { *result = json_ptr; }
    if json_ptr.is_null() { ErrorCode::InternalError as c_int } else { code as c_int }
}

// Helper to parse JSON input
pub fn parse_json_input<T: for<'de> Deserialize<'de>>(input: *const c_char) -> FFIResult<T> {
    if input.is_null() {
        return Err(FFIError::new(ErrorCode::NullPointer, "Input JSON is null"));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    let json_str = c_str.to_str()
        .map_err(|_| FFIError::new(ErrorCode::InvalidUtf8, "Invalid UTF-8 in input JSON"))?;

    serde_json::from_str(json_str)
        .map_err(|e| FFIError::with_details(
            ErrorCode::InvalidArgument,
            "JSON parsing failed",
            &format!("Failed to parse JSON: {}", e)
        ))
}

// Re-export FFIResult for convenience
pub use error::FFIResult;
