//! Buffers that cross the boundary.
//!
//! Two allocators are in play and must never be mixed:
//! - host-filled strings (resolver results) use `sg_alloc_string` /
//!   `sg_free_string`, backed by the C allocator;
//! - encoded validation results use `sg_free_json`, matching the `CString`
//!   they were created from.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error;

/// Allocate a zero-initialised buffer of `size` bytes for the host to fill
/// with a NUL-terminated string.
///
/// Returns `NULL` only when the allocation cannot be satisfied.
#[no_mangle]
pub extern "C" fn sg_alloc_string(size: usize) -> *mut c_char {
    crate::ffi_boundary(ptr::null_mut(), || {
        // SAFETY: calloc with a non-zero size either fails with null or returns
        // a zeroed block of at least that size.
        let buffer = unsafe { libc::calloc(size.max(1), 1) }.cast::<c_char>();
        if buffer.is_null() {
            tracing::warn!(size, "string allocation failed");
            error::set_error_message(format!("failed to allocate {size} bytes"));
        }
        buffer
    })
}

/// Free a buffer returned by `sg_alloc_string`.
///
/// # Safety
/// `buffer` must be null or a pointer from `sg_alloc_string` that has not
/// been freed yet. Freeing twice is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn sg_free_string(buffer: *mut c_char) {
    crate::ffi_boundary((), || {
        if buffer.is_null() {
            return;
        }
        // SAFETY: Caller guarantees `buffer` came from sg_alloc_string (calloc).
        unsafe { libc::free(buffer.cast()) };
    });
}

/// Free an encoded result returned by `sg_validate_with_output`.
///
/// # Safety
/// `buffer` must be null or a pointer from `sg_validate_with_output` that has
/// not been freed yet. Freeing twice is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn sg_free_json(buffer: *mut c_char) {
    crate::ffi_boundary((), || {
        if buffer.is_null() {
            return;
        }
        // SAFETY: Caller guarantees `buffer` came from CString::into_raw in into_encoded.
        unsafe { drop(CString::from_raw(buffer)) };
    });
}

/// Hand an encoded document to the host. Released with `sg_free_json`.
pub(crate) fn into_encoded(document: String) -> *mut c_char {
    match CString::new(document) {
        Ok(encoded) => encoded.into_raw(),
        Err(_) => {
            error::set_error_message("encoded result contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Take ownership of a host-filled buffer: copy its text, then free it.
///
/// Returns `None` for null buffers and for text that is not UTF-8; the buffer
/// is freed either way.
///
/// # Safety
/// `buffer` must be null or a NUL-terminated string from `sg_alloc_string`
/// that nobody else will free.
pub(crate) unsafe fn take_host_string(buffer: *mut c_char) -> Option<String> {
    if buffer.is_null() {
        return None;
    }

    let text = {
        // SAFETY: Caller guarantees a NUL-terminated string.
        let raw = unsafe { CStr::from_ptr(buffer) };
        raw.to_str().ok().map(str::to_owned)
    };

    // SAFETY: Ownership was transferred to us and `raw` is no longer borrowed.
    unsafe { libc::free(buffer.cast()) };
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_string(text: &str) -> *mut c_char {
        let buffer = sg_alloc_string(text.len() + 1);
        assert!(!buffer.is_null());
        // SAFETY: buffer holds text.len() + 1 zeroed bytes.
        unsafe { ptr::copy_nonoverlapping(text.as_ptr(), buffer.cast::<u8>(), text.len()) };
        buffer
    }

    #[test]
    fn alloc_returns_zeroed_buffer() {
        let buffer = sg_alloc_string(16);
        assert!(!buffer.is_null());
        // SAFETY: buffer is 16 zeroed bytes.
        assert_eq!(unsafe { CStr::from_ptr(buffer) }.to_bytes(), b"");
        // SAFETY: buffer came from sg_alloc_string.
        unsafe { sg_free_string(buffer) };
    }

    #[test]
    fn zero_sized_alloc_is_still_usable() {
        let buffer = sg_alloc_string(0);
        assert!(!buffer.is_null());
        // SAFETY: buffer came from sg_alloc_string.
        unsafe { sg_free_string(buffer) };
    }

    #[test]
    fn take_host_string_copies_text() {
        let buffer = host_string(r#"{"type":"integer"}"#);
        // SAFETY: buffer came from sg_alloc_string and is handed over here.
        let text = unsafe { take_host_string(buffer) };
        assert_eq!(text.as_deref(), Some(r#"{"type":"integer"}"#));
    }

    #[test]
    fn take_host_string_handles_null() {
        // SAFETY: null is accepted.
        assert!(unsafe { take_host_string(ptr::null_mut()) }.is_none());
    }

    #[test]
    fn encoded_round_trip_through_free_json() {
        let encoded = into_encoded(r#"{"valid":true}"#.to_string());
        assert!(!encoded.is_null());
        // SAFETY: encoded is a NUL-terminated string from into_encoded.
        assert_eq!(
            unsafe { CStr::from_ptr(encoded) }.to_str().unwrap(),
            r#"{"valid":true}"#
        );
        // SAFETY: encoded came from into_encoded.
        unsafe { sg_free_json(encoded) };
    }

    #[test]
    fn free_functions_ignore_null() {
        // SAFETY: null is accepted.
        unsafe {
            sg_free_string(ptr::null_mut());
            sg_free_json(ptr::null_mut());
        }
    }
}
