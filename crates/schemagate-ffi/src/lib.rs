//! schemagate-ffi: C-ABI exports for compiling and evaluating JSON Schemas.
//!
//! Compiled schemas live in a process-wide handle registry and are named by
//! non-zero `int64_t` handles. Every export converts failures, including
//! panics, into its sentinel (`0`, `false` or `NULL`); the reason is available
//! from [`sg_last_error`] on the calling thread.

mod args;
mod buffer;
mod error;
mod handles;
mod schema;
mod store;
mod types;

use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;

pub use buffer::{sg_alloc_string, sg_free_json, sg_free_string};
pub use schema::{
    sg_compile, sg_compile_with_mode, sg_free_template, sg_validate, sg_validate_with_output,
};
pub use store::{sg_store_clear, sg_store_contains, sg_store_register, sg_store_unregister};
pub use types::{SgHandle, SgResolverFn, SG_INVALID_HANDLE, SG_MODE_EXHAUSTIVE, SG_MODE_FAST};

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn sg_init() {
    ffi_boundary((), error::clear_error_state);
}

#[no_mangle]
pub extern "C" fn sg_cleanup() {
    ffi_boundary((), error::clear_error_state);
}

/// Last failure message recorded on the calling thread; empty when none.
///
/// The pointer stays valid until the next `sg_*` call on the same thread.
#[no_mangle]
pub extern "C" fn sg_last_error() -> *const c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

#[no_mangle]
pub extern "C" fn sg_version() -> *const c_char {
    VERSION.as_ptr().cast()
}
