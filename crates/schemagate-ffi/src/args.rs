use std::ffi::CStr;
use std::os::raw::c_char;

use crate::error;

/// Convert a required C string argument into UTF-8 `&str`.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
pub(crate) unsafe fn required_str_arg<'a>(value: *const c_char, name: &str) -> Option<&'a str> {
    if value.is_null() {
        error::set_error_message(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
    unsafe { utf8_arg(value, name) }
}

/// Convert an optional C string argument. Null maps to `Some(None)`; the
/// outer `None` reports invalid UTF-8.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
pub(crate) unsafe fn optional_str_arg<'a>(
    value: *const c_char,
    name: &str,
) -> Option<Option<&'a str>> {
    if value.is_null() {
        return Some(None);
    }

    // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
    unsafe { utf8_arg(value, name) }.map(Some)
}

unsafe fn utf8_arg<'a>(value: *const c_char, name: &str) -> Option<&'a str> {
    let as_cstr = {
        // SAFETY: Non-null and NUL-terminated per the callers' contracts.
        unsafe { CStr::from_ptr(value) }
    };

    match as_cstr.to_str() {
        Ok(v) => Some(v),
        Err(_) => {
            error::set_error_message(format!("{name} must be valid UTF-8"));
            None
        }
    }
}
