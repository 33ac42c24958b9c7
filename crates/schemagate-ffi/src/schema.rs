use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::Arc;

use schemagate_engine::{CompiledSchema, EngineConfig, Mode, Resolver};

use crate::handles::{templates, HandleError};
use crate::types::{SgHandle, SgResolverFn, SG_INVALID_HANDLE, SG_MODE_EXHAUSTIVE};
use crate::{args, buffer, error, store};

/// Host callback adapted to the engine's [`Resolver`].
struct HostResolver {
    callback: unsafe extern "C" fn(uri: *const c_char) -> *mut c_char,
}

impl Resolver for HostResolver {
    fn resolve(&self, uri: &str) -> Option<String> {
        let uri = CString::new(uri).ok()?;
        let raw = {
            // SAFETY: The host supplied this callback for the duration of the
            // compile call we are running inside.
            unsafe { (self.callback)(uri.as_ptr()) }
        };
        // SAFETY: Non-null callback results are allocated with sg_alloc_string
        // and ownership passes to us.
        unsafe { buffer::take_host_string(raw) }
    }
}

/// Compile `schema` into a handle, collecting every error in detailed output.
///
/// Returns `0` on any failure.
///
/// # Safety
/// `schema` and `default_dialect` must be null or valid NUL-terminated C
/// strings. `resolver`, when set, must stay callable until this call returns.
#[no_mangle]
pub unsafe extern "C" fn sg_compile(
    schema: *const c_char,
    resolver: SgResolverFn,
    default_dialect: *const c_char,
) -> SgHandle {
    // SAFETY: Forwarded caller contract.
    unsafe { sg_compile_with_mode(schema, resolver, default_dialect, SG_MODE_EXHAUSTIVE) }
}

/// Compile `schema` with an explicit mode (`SG_MODE_FAST` or
/// `SG_MODE_EXHAUSTIVE`). Returns `0` on any failure.
///
/// # Safety
/// Same as [`sg_compile`].
#[no_mangle]
pub unsafe extern "C" fn sg_compile_with_mode(
    schema: *const c_char,
    resolver: SgResolverFn,
    default_dialect: *const c_char,
    mode: i32,
) -> SgHandle {
    crate::ffi_boundary(SG_INVALID_HANDLE, || {
        error::clear_error_state();

        let schema = {
            // SAFETY: We validate null and UTF-8 in helper.
            match unsafe { args::required_str_arg(schema, "schema") } {
                Some(v) => v,
                None => return SG_INVALID_HANDLE,
            }
        };
        let default_dialect = {
            // SAFETY: We validate UTF-8 in helper; null is allowed.
            match unsafe { args::optional_str_arg(default_dialect, "default_dialect") } {
                Some(v) => v,
                None => return SG_INVALID_HANDLE,
            }
        };
        let Some(mode) = Mode::from_raw(mode) else {
            error::set_error_message(format!("unknown mode {mode}"));
            return SG_INVALID_HANDLE;
        };

        let config = EngineConfig::default()
            .with_mode(mode)
            .with_default_dialect(default_dialect);
        let host = resolver.map(|callback| Arc::new(HostResolver { callback }) as Arc<dyn Resolver>);

        match schemagate_engine::compile_text(schema, store::global_store(), host, &config) {
            Ok(compiled) => {
                let handle = templates().create(compiled);
                tracing::debug!(handle, "compiled schema registered");
                handle
            }
            Err(err) => {
                error::record_engine_error(&err);
                SG_INVALID_HANDLE
            }
        }
    })
}

/// Validate `instance` against a compiled schema.
///
/// Returns `false` when invalid and on any failure, including an unknown
/// handle or unparsable instance.
///
/// # Safety
/// `instance` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn sg_validate(handle: SgHandle, instance: *const c_char) -> bool {
    crate::ffi_boundary(false, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(instance) = (unsafe { args::required_str_arg(instance, "instance") }) else {
            return false;
        };
        let Some(compiled) = lookup(handle) else {
            return false;
        };

        match compiled.validate_text(instance, &EngineConfig::default()) {
            Ok(valid) => valid,
            Err(err) => {
                error::record_engine_error(&err);
                false
            }
        }
    })
}

/// Validate `instance` and return the encoded result document:
/// `{"valid":true}` or `{"valid":false,"errors":[...]}`.
///
/// Returns `NULL` on any failure. Release the result with `sg_free_json`.
///
/// # Safety
/// `instance` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn sg_validate_with_output(
    handle: SgHandle,
    instance: *const c_char,
) -> *mut c_char {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(instance) = (unsafe { args::required_str_arg(instance, "instance") }) else {
            return std::ptr::null_mut();
        };
        let Some(compiled) = lookup(handle) else {
            return std::ptr::null_mut();
        };

        let encoded = compiled
            .evaluate_text(instance, &EngineConfig::default())
            .and_then(|outcome| outcome.to_json());
        match encoded {
            Ok(document) => buffer::into_encoded(document),
            Err(err) => {
                error::record_engine_error(&err);
                std::ptr::null_mut()
            }
        }
    })
}

/// Release a compiled schema. `0` is a no-op; freeing a handle twice is
/// rejected and reported through `sg_last_error`.
#[no_mangle]
pub extern "C" fn sg_free_template(handle: SgHandle) {
    crate::ffi_boundary((), || {
        error::clear_error_state();

        match templates().release(handle) {
            Ok(()) => tracing::debug!(handle, "compiled schema released"),
            Err(err) => reject_handle(err),
        }
    });
}

fn lookup(handle: SgHandle) -> Option<Arc<CompiledSchema>> {
    templates().get(handle).map_err(reject_handle).ok()
}

fn reject_handle(err: HandleError) {
    tracing::warn!(error = %err, "rejected schema handle");
    error::set_error_message(err.to_string());
}
