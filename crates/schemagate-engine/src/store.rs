use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;

use serde_json::Value;
use url::Url;

use crate::config::StoreLimits;
use crate::error::{EngineError, Result};

/// URI-keyed store of pre-registered schema documents.
///
/// The store is the first resolver the bridge consults, so a document
/// registered here always wins over whatever a host callback would return
/// for the same URI.
#[derive(Debug, Default)]
pub struct SchemaStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register schema text under `uri`, replacing any previous entry.
    pub fn register(&self, uri: &str, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(uri, schema);
        Ok(())
    }

    /// Register an already-parsed schema under `uri`.
    pub fn register_value(&self, uri: &str, schema: Value) {
        tracing::debug!(uri, "registering schema");
        let mut documents = self.documents.write().unwrap_or_else(|err| err.into_inner());
        documents.insert(canonical_uri(uri), schema);
    }

    /// Remove the entry for `uri`. Returns whether one existed.
    pub fn unregister(&self, uri: &str) -> bool {
        let mut documents = self.documents.write().unwrap_or_else(|err| err.into_inner());
        documents.remove(&canonical_uri(uri)).is_some()
    }

    pub fn contains(&self, uri: &str) -> bool {
        let documents = self.documents.read().unwrap_or_else(|err| err.into_inner());
        documents.contains_key(&canonical_uri(uri))
    }

    pub fn clear(&self) {
        let mut documents = self.documents.write().unwrap_or_else(|err| err.into_inner());
        documents.clear();
    }

    /// Look up a document by URI, returning an owned copy.
    pub fn lookup(&self, uri: &str) -> Option<Value> {
        let documents = self.documents.read().unwrap_or_else(|err| err.into_inner());
        documents.get(&canonical_uri(uri)).cloned()
    }

    /// Load every `*.json` file in `path`, keyed by its `$id`.
    ///
    /// Returns the number of schemas registered.
    pub fn load_directory(&self, path: &Path, limits: StoreLimits) -> Result<usize> {
        let mut loaded = 0usize;

        let entries = std::fs::read_dir(path)
            .map_err(|err| EngineError::LoadFailed(format!("{}: {err}", path.display())))?;

        for entry in entries {
            let entry = entry.map_err(|err| EngineError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.to_ascii_lowercase().ends_with(".json") {
                continue;
            }

            let entry_path = entry.path();
            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| EngineError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();
            if file_type.is_symlink() {
                return Err(EngineError::LoadFailed(format!(
                    "refusing to load schema symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            loaded = loaded.saturating_add(1);
            if loaded > limits.max_schemas_from_directory {
                return Err(EngineError::LoadFailed(format!(
                    "schema count exceeds configured max ({}): {}",
                    limits.max_schemas_from_directory, loaded
                )));
            }

            let content = read_limited(&entry_path, &file_name, limits.max_schema_file_size)?;
            let schema: Value = serde_json::from_str(&content).map_err(|err| {
                EngineError::LoadFailed(format!("{file_name} is not valid JSON: {err}"))
            })?;
            let id = schema
                .get("$id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| EngineError::LoadFailed(format!("{file_name} has no string $id")))?;

            self.register_value(&id, schema);
        }

        tracing::debug!(path = %path.display(), loaded, "loaded schema directory");
        Ok(loaded)
    }
}

fn read_limited(path: &Path, file_name: &str, max_bytes: usize) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|err| {
        EngineError::LoadFailed(format!("failed opening schema {}: {err}", path.display()))
    })?;
    let metadata = file
        .metadata()
        .map_err(|err| EngineError::LoadFailed(err.to_string()))?;
    if metadata.len() > max_bytes as u64 {
        return Err(EngineError::LoadFailed(format!(
            "schema file too large ({} bytes): {file_name}",
            metadata.len()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            EngineError::LoadFailed(format!("failed reading schema {}: {err}", path.display()))
        })?;
    if content.len() > max_bytes {
        return Err(EngineError::LoadFailed(format!(
            "schema file too large while reading: {file_name}"
        )));
    }
    Ok(content)
}

/// Key under which `uri` is stored and looked up.
///
/// Absolute URIs are parsed and re-serialized, which lowercases the scheme
/// and host, removes `.`/`..` path segments and normalizes percent-encoding.
/// An empty trailing fragment is dropped so `a#` and `a` share one entry.
/// Text that does not parse as a URI is used as is.
pub fn canonical_uri(uri: &str) -> String {
    let uri = uri.strip_suffix('#').unwrap_or(uri);
    match Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.fragment() == Some("") {
                parsed.set_fragment(None);
            }
            parsed.into()
        }
        Err(_) => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const INTEGER_SCHEMA: &str = r#"{
        "$id": "https://example.com/schemas/integer.json",
        "type": "integer"
    }"#;

    #[test]
    fn register_lookup_and_unregister() {
        let store = SchemaStore::new();
        store
            .register("https://example.com/schemas/integer.json", INTEGER_SCHEMA)
            .unwrap();

        assert!(store.contains("https://example.com/schemas/integer.json"));
        assert!(store.contains("https://example.com/schemas/integer.json#"));
        let doc = store.lookup("https://example.com/schemas/integer.json").unwrap();
        assert_eq!(doc["type"], "integer");

        assert!(store.unregister("https://example.com/schemas/integer.json"));
        assert!(!store.unregister("https://example.com/schemas/integer.json"));
        assert!(store.lookup("https://example.com/schemas/integer.json").is_none());
    }

    #[test]
    fn malformed_text_is_rejected() {
        let store = SchemaStore::new();
        assert!(matches!(
            store.register("urn:bad", "{not json"),
            Err(EngineError::InvalidJson(_))
        ));
        assert!(!store.contains("urn:bad"));
    }

    #[test]
    fn equivalent_uri_spellings_share_an_entry() {
        let store = SchemaStore::new();
        store
            .register("HTTPS://Schemas.Example.COM/a/../shared/integer.json#", INTEGER_SCHEMA)
            .unwrap();

        assert!(store.contains("https://schemas.example.com/shared/integer.json"));
        assert!(store.lookup("https://schemas.example.com/shared/./integer.json").is_some());
        assert!(store.unregister("https://schemas.example.com/shared/integer.json#"));
        assert!(!store.contains("HTTPS://Schemas.Example.COM/a/../shared/integer.json"));
    }

    #[test]
    fn canonical_uri_forms() {
        assert_eq!(
            canonical_uri("HTTP://Example.com/x/../y.json#"),
            "http://example.com/y.json"
        );
        assert_eq!(canonical_uri("urn:example:schema#"), "urn:example:schema");
        assert_eq!(canonical_uri("not a uri"), "not a uri");
    }

    #[test]
    fn clear_removes_everything() {
        let store = SchemaStore::new();
        store.register("urn:a", "{}").unwrap();
        store.register("urn:b", "true").unwrap();
        assert!(store.contains("urn:a") && store.contains("urn:b"));

        store.clear();
        assert!(!store.contains("urn:a"));
        assert!(!store.contains("urn:b"));
    }

    #[test]
    fn load_directory_keys_by_id() {
        let dir = make_temp_schema_dir("by-id");
        write_schema(&dir, "integer.json", INTEGER_SCHEMA);
        write_schema(&dir, "notes.txt", "ignored");

        let store = SchemaStore::new();
        let loaded = store.load_directory(&dir, StoreLimits::default()).unwrap();
        assert_eq!(loaded, 1);
        assert!(store.contains("https://example.com/schemas/integer.json"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_directory_requires_id() {
        let dir = make_temp_schema_dir("no-id");
        write_schema(&dir, "anon.json", r#"{"type":"string"}"#);

        let store = SchemaStore::new();
        let result = store.load_directory(&dir, StoreLimits::default());
        assert!(matches!(result, Err(EngineError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_count_limit_is_enforced() {
        let dir = make_temp_schema_dir("count-limit");
        write_schema(&dir, "a.json", r#"{"$id":"urn:a"}"#);
        write_schema(&dir, "b.json", r#"{"$id":"urn:b"}"#);

        let limits = StoreLimits {
            max_schemas_from_directory: 1,
            ..StoreLimits::default()
        };
        let result = SchemaStore::new().load_directory(&dir, limits);
        assert!(matches!(result, Err(EngineError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_file_size_limit_is_enforced() {
        let dir = make_temp_schema_dir("size-limit");
        write_schema(&dir, "integer.json", INTEGER_SCHEMA);

        let limits = StoreLimits {
            max_schema_file_size: 8,
            ..StoreLimits::default()
        };
        let result = SchemaStore::new().load_directory(&dir, limits);
        assert!(matches!(result, Err(EngineError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_schema_is_rejected() {
        let dir = make_temp_schema_dir("symlink");
        let target = dir.join("target.data");
        std::fs::write(&target, INTEGER_SCHEMA.as_bytes()).unwrap();
        std::os::unix::fs::symlink(&target, dir.join("integer.json")).unwrap();

        let result = SchemaStore::new().load_directory(&dir, StoreLimits::default());
        assert!(matches!(result, Err(EngineError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn make_temp_schema_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "schemagate-store-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_schema(dir: &Path, file_name: &str, contents: &str) {
        std::fs::write(dir.join(file_name), contents.as_bytes()).unwrap();
    }
}
