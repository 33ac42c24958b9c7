use std::os::raw::c_char;
use std::sync::{Arc, OnceLock};

use schemagate_engine::SchemaStore;

use crate::{args, error};

static STORE: OnceLock<Arc<SchemaStore>> = OnceLock::new();

/// Process-wide store consulted before any host resolver.
pub(crate) fn global_store() -> Arc<SchemaStore> {
    Arc::clone(STORE.get_or_init(|| Arc::new(SchemaStore::new())))
}

/// Pre-register schema text under `uri`.
///
/// Returns `false` when either argument is null or the text is not JSON.
///
/// # Safety
/// `uri` and `schema` must be null or valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn sg_store_register(uri: *const c_char, schema: *const c_char) -> bool {
    crate::ffi_boundary(false, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(uri) = (unsafe { args::required_str_arg(uri, "uri") }) else {
            return false;
        };
        // SAFETY: We validate null and UTF-8 in helper.
        let Some(schema) = (unsafe { args::required_str_arg(schema, "schema") }) else {
            return false;
        };

        match global_store().register(uri, schema) {
            Ok(()) => true,
            Err(err) => {
                error::record_engine_error(&err);
                false
            }
        }
    })
}

/// Remove the schema registered under `uri`. Returns whether one existed.
///
/// # Safety
/// `uri` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn sg_store_unregister(uri: *const c_char) -> bool {
    crate::ffi_boundary(false, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        match unsafe { args::required_str_arg(uri, "uri") } {
            Some(uri) => global_store().unregister(uri),
            None => false,
        }
    })
}

/// # Safety
/// `uri` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn sg_store_contains(uri: *const c_char) -> bool {
    crate::ffi_boundary(false, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        match unsafe { args::required_str_arg(uri, "uri") } {
            Some(uri) => global_store().contains(uri),
            None => false,
        }
    })
}

#[no_mangle]
pub extern "C" fn sg_store_clear() {
    crate::ffi_boundary((), || {
        error::clear_error_state();
        global_store().clear();
    });
}
