use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use schemagate_engine::CompiledSchema;

use crate::types::{SgHandle, SG_INVALID_HANDLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum HandleError {
    #[error("schema handle cannot be 0")]
    Sentinel,

    #[error("schema handle {0} is not live (never issued or already freed)")]
    Unknown(SgHandle),
}

/// Owns values on behalf of the host, which only ever sees integer handles.
///
/// Lookups hand out an `Arc`, so a release racing a validation on another
/// thread drops the registry's reference without invalidating the borrow in
/// flight; every lookup issued after the release fails.
pub(crate) struct HandleRegistry<T> {
    entries: Mutex<HashMap<SgHandle, Arc<T>>>,
    next: AtomicI64,
}

impl<T> HandleRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next: AtomicI64::new(1),
        }
    }

    pub(crate) fn create(&self, value: T) -> SgHandle {
        let mut entries = self.lock();
        let handle = loop {
            let candidate = self.next.fetch_add(1, Ordering::Relaxed);
            if candidate != SG_INVALID_HANDLE && !entries.contains_key(&candidate) {
                break candidate;
            }
        };
        entries.insert(handle, Arc::new(value));
        handle
    }

    pub(crate) fn get(&self, handle: SgHandle) -> Result<Arc<T>, HandleError> {
        if handle == SG_INVALID_HANDLE {
            return Err(HandleError::Sentinel);
        }
        self.lock()
            .get(&handle)
            .cloned()
            .ok_or(HandleError::Unknown(handle))
    }

    /// Drop the registry's reference. Releasing the sentinel is a no-op.
    pub(crate) fn release(&self, handle: SgHandle) -> Result<(), HandleError> {
        if handle == SG_INVALID_HANDLE {
            return Ok(());
        }
        let removed = self.lock().remove(&handle);
        match removed {
            Some(_) => Ok(()),
            None => Err(HandleError::Unknown(handle)),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SgHandle, Arc<T>>> {
        self.entries.lock().unwrap_or_else(|err| err.into_inner())
    }
}

static TEMPLATES: OnceLock<HandleRegistry<CompiledSchema>> = OnceLock::new();

/// Registry of compiled schemas issued through `sg_compile`.
pub(crate) fn templates() -> &'static HandleRegistry<CompiledSchema> {
    TEMPLATES.get_or_init(HandleRegistry::new)
}
