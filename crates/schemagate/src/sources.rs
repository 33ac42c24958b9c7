use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use schemagate_engine::{canonical_uri, EngineConfig, Resolver, SchemaStore};

use crate::cmd::ResolverArgs;
use crate::exit::{engine_error, CliError, CliResult, USAGE};

/// Resolves `--ref URI=PATH` entries, reading each file only when the
/// compiler asks for it.
#[derive(Debug, Default)]
pub struct FileResolver {
    files: HashMap<String, PathBuf>,
}

impl FileResolver {
    pub fn from_refs(refs: &[String]) -> CliResult<Self> {
        let mut files = HashMap::new();
        for entry in refs {
            let (uri, path) = entry.split_once('=').ok_or_else(|| {
                CliError::new(USAGE, format!("--ref expects URI=PATH, got {entry:?}"))
            })?;
            if uri.is_empty() || path.is_empty() {
                return Err(CliError::new(
                    USAGE,
                    format!("--ref expects URI=PATH, got {entry:?}"),
                ));
            }
            files.insert(canonical_uri(uri), PathBuf::from(path));
        }
        Ok(Self { files })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Resolver for FileResolver {
    fn resolve(&self, uri: &str) -> Option<String> {
        let path = self.files.get(&canonical_uri(uri))?;
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(uri, path = %path.display(), "resolved reference from file");
                Some(text)
            }
            Err(err) => {
                tracing::warn!(uri, path = %path.display(), error = %err, "failed reading reference");
                None
            }
        }
    }
}

/// Store and host resolver for one command invocation.
pub struct Sources {
    pub store: Arc<SchemaStore>,
    pub resolver: Option<Arc<dyn Resolver>>,
}

impl Sources {
    pub fn from_args(args: &ResolverArgs, config: &EngineConfig) -> CliResult<Self> {
        let store = SchemaStore::new();
        if let Some(dir) = &args.schema_dir {
            store
                .load_directory(dir, config.store_limits)
                .map_err(|err| engine_error("loading schema directory failed", err))?;
        }

        let files = FileResolver::from_refs(&args.refs)?;
        let resolver = if files.is_empty() {
            None
        } else {
            Some(Arc::new(files) as Arc<dyn Resolver>)
        };

        Ok(Self {
            store: Arc::new(store),
            resolver,
        })
    }
}
