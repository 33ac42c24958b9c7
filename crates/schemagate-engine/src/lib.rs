//! JSON Schema compile/evaluate adapter for the schemagate C boundary.
//!
//! Turns schema text into a reusable [`CompiledSchema`], resolving external
//! `$ref` targets through a [`ResolverBridge`] that consults the
//! pre-registered [`SchemaStore`] first and a host-supplied [`Resolver`]
//! second. Evaluation produces an [`Outcome`] that serializes to a flat,
//! self-describing JSON document.
//!
//! Nothing in this crate knows about raw pointers; the `schemagate-ffi`
//! crate layers handles and buffer ownership on top.

pub mod compiler;
pub mod config;
pub mod error;
pub mod outcome;
pub mod resolver;
pub mod store;

pub use compiler::{compile, compile_text, parse, CompiledSchema};
pub use config::{EngineConfig, Mode, StoreLimits};
pub use error::{EngineError, Result};
pub use outcome::{ErrorEntry, Outcome};
pub use resolver::{CallbackSlot, Resolver, ResolverBridge, SlotGuard};
pub use store::{canonical_uri, SchemaStore};
