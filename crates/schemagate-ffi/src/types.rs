use std::os::raw::c_char;

/// Opaque identifier of a compiled schema. `0` never names a live schema.
pub type SgHandle = i64;

pub const SG_INVALID_HANDLE: SgHandle = 0;

/// Detailed output stops at the first error.
pub const SG_MODE_FAST: i32 = 0;
/// Detailed output lists every error.
pub const SG_MODE_EXHAUSTIVE: i32 = 1;

/// Host resolver: returns schema text for `uri`, or `NULL` when unknown.
///
/// Non-null results must come from `sg_alloc_string`; ownership passes to the
/// library, which frees the buffer once the text has been copied.
pub type SgResolverFn = Option<unsafe extern "C" fn(uri: *const c_char) -> *mut c_char>;
