use std::sync::{Arc, Mutex};

use jsonschema::{Retrieve, Uri};
use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::store::SchemaStore;

/// Host-side source of schema text, consulted after the store.
///
/// `None` means "not found by this resolver". Returned text is parsed by the
/// bridge; text that fails to parse counts as unresolved.
pub trait Resolver: Send + Sync {
    fn resolve(&self, uri: &str) -> Option<String>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, uri: &str) -> Option<String> {
        self(uri)
    }
}

/// Call-scoped holder for the host resolver.
///
/// Each compile creates its own slot and hands a clone to the bridge, so
/// concurrent compiles on different threads never see each other's resolver.
#[derive(Clone, Default)]
pub struct CallbackSlot {
    current: Arc<Mutex<Option<Arc<dyn Resolver>>>>,
}

impl CallbackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `resolver` until the returned guard is dropped.
    #[must_use = "the resolver is cleared as soon as the guard is dropped"]
    pub fn install(&self, resolver: Arc<dyn Resolver>) -> SlotGuard {
        *self.lock() = Some(resolver);
        SlotGuard { slot: self.clone() }
    }

    #[cfg(test)]
    fn is_installed(&self) -> bool {
        self.lock().is_some()
    }

    // Clone out so the lock is not held while host code runs; the host
    // resolver may itself start a nested compile.
    fn current(&self) -> Option<Arc<dyn Resolver>> {
        self.lock().clone()
    }

    fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn Resolver>>> {
        self.current.lock().unwrap_or_else(|err| err.into_inner())
    }
}

/// Clears its [`CallbackSlot`] on drop, on every exit path.
pub struct SlotGuard {
    slot: CallbackSlot,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.clear();
    }
}

/// Single resolution function handed to the compiler: store first, host
/// resolver second, unresolved otherwise.
pub struct ResolverBridge {
    store: Arc<SchemaStore>,
    slot: CallbackSlot,
    max_document_bytes: usize,
}

impl ResolverBridge {
    pub fn new(store: Arc<SchemaStore>, slot: CallbackSlot, max_document_bytes: usize) -> Self {
        Self {
            store,
            slot,
            max_document_bytes,
        }
    }

    pub fn resolve(&self, uri: &str) -> Result<Value> {
        if let Some(document) = self.store.lookup(uri) {
            tracing::debug!(uri, "resolved from schema store");
            return Ok(document);
        }

        let Some(resolver) = self.slot.current() else {
            tracing::debug!(uri, "no host resolver installed");
            return Err(EngineError::Unresolved(uri.to_string()));
        };

        let Some(text) = resolver.resolve(uri) else {
            tracing::debug!(uri, "host resolver returned nothing");
            return Err(EngineError::Unresolved(uri.to_string()));
        };

        if text.len() > self.max_document_bytes {
            tracing::warn!(uri, size = text.len(), "resolved document too large");
            return Err(EngineError::Unresolved(format!(
                "{uri}: document too large ({} bytes)",
                text.len()
            )));
        }

        serde_json::from_str(&text).map_err(|err| {
            tracing::debug!(uri, error = %err, "resolved document is not valid JSON");
            EngineError::Unresolved(format!("{uri}: {err}"))
        })
    }
}

impl Retrieve for ResolverBridge {
    fn retrieve(
        &self,
        uri: &Uri<String>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        self.resolve(uri.as_str()).map_err(Into::into)
    }
}
