use std::sync::Arc;

use jsonschema::{Draft, ValidationError, Validator};
use serde_json::Value;

use crate::config::{draft_for_dialect, EngineConfig, Mode};
use crate::error::{EngineError, Result};
use crate::outcome::{ErrorEntry, Outcome};
use crate::resolver::{CallbackSlot, Resolver, ResolverBridge};
use crate::store::SchemaStore;

/// A schema compiled into an executable validator.
///
/// Immutable once built; share it behind an `Arc` to validate from
/// several threads.
pub struct CompiledSchema {
    validator: Validator,
    mode: Mode,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Parse document text, enforcing the configured size limit.
pub fn parse(text: &str, config: &EngineConfig) -> Result<Value> {
    config.check_size(text)?;
    Ok(serde_json::from_str(text)?)
}

/// Compile schema text. See [`compile`].
pub fn compile_text(
    schema_json: &str,
    store: Arc<SchemaStore>,
    resolver: Option<Arc<dyn Resolver>>,
    config: &EngineConfig,
) -> Result<CompiledSchema> {
    let schema = parse(schema_json, config)?;
    compile(&schema, store, resolver, config)
}

/// Compile a parsed schema.
///
/// External references are resolved through `store` first and `resolver`
/// second. The resolver is only reachable while this call runs.
pub fn compile(
    schema: &Value,
    store: Arc<SchemaStore>,
    resolver: Option<Arc<dyn Resolver>>,
    config: &EngineConfig,
) -> Result<CompiledSchema> {
    let draft = default_draft(schema, config)?;

    let slot = CallbackSlot::new();
    let _guard = resolver.map(|resolver| slot.install(resolver));
    let bridge = ResolverBridge::new(store, slot, config.max_document_bytes);

    let built = match draft {
        Some(draft) => jsonschema::options()
            .with_draft(draft)
            .with_retriever(bridge)
            .build(schema),
        None => jsonschema::options().with_retriever(bridge).build(schema),
    };

    let validator = built.map_err(|err| {
        tracing::debug!(error = %err, "schema compilation failed");
        EngineError::CompileFailed(err.to_string())
    })?;

    tracing::debug!(mode = ?config.mode, "schema compiled");
    Ok(CompiledSchema {
        validator,
        mode: config.mode,
    })
}

/// The draft to force, if any: the configured default dialect applies only
/// to schemas that do not declare `$schema` themselves.
fn default_draft(schema: &Value, config: &EngineConfig) -> Result<Option<Draft>> {
    let Some(dialect) = config.default_dialect.as_deref() else {
        return Ok(None);
    };
    let draft = draft_for_dialect(dialect)?;

    let declares_dialect = schema
        .as_object()
        .is_some_and(|map| map.contains_key("$schema"));
    Ok((!declares_dialect).then_some(draft))
}

impl CompiledSchema {
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Evaluate `instance`, collecting errors according to the compile mode.
    pub fn evaluate(&self, instance: &Value) -> Outcome {
        let limit = match self.mode {
            Mode::FastValidation => 1,
            Mode::Exhaustive => usize::MAX,
        };
        let errors = self
            .validator
            .iter_errors(instance)
            .take(limit)
            .map(|err| entry_from_error(&err))
            .collect();
        Outcome::from_errors(errors)
    }

    /// Parse and check instance text.
    pub fn validate_text(&self, instance_json: &str, config: &EngineConfig) -> Result<bool> {
        let instance = parse(instance_json, config)?;
        Ok(self.is_valid(&instance))
    }

    /// Parse and evaluate instance text.
    pub fn evaluate_text(&self, instance_json: &str, config: &EngineConfig) -> Result<Outcome> {
        let instance = parse(instance_json, config)?;
        Ok(self.evaluate(&instance))
    }
}

fn entry_from_error(err: &ValidationError<'_>) -> ErrorEntry {
    ErrorEntry {
        message: err.to_string(),
        instance_location: err.instance_path().to_string(),
        evaluate_path: err.evaluation_path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const STRING_SCHEMA: &str = r#"{"type":"string"}"#;
    const REMOTE_REF_SCHEMA: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$ref": "https://example.com/schemas/integer.json"
    }"#;

    fn compile_plain(schema: &str) -> Result<CompiledSchema> {
        compile_text(
            schema,
            Arc::new(SchemaStore::new()),
            None,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn string_schema_scenario() {
        let config = EngineConfig::default();
        let compiled = compile_plain(STRING_SCHEMA).unwrap();

        assert!(compiled.validate_text(r#""hello""#, &config).unwrap());
        assert!(!compiled.validate_text("42", &config).unwrap());

        let outcome = compiled.evaluate_text("42", &config).unwrap();
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].instance_location, "");
        assert!(outcome.errors()[0].evaluate_path.ends_with("type"));
    }

    #[test]
    fn evaluate_path_follows_local_refs() {
        let compiled =
            compile_plain(r##"{"$defs":{"s":{"type":"string"}},"$ref":"#/$defs/s"}"##).unwrap();

        let outcome = compiled.evaluate(&serde_json::json!(42));
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].evaluate_path, "/$ref/type");
    }

    #[test]
    fn valid_instance_has_no_errors() {
        let compiled = compile_plain(STRING_SCHEMA).unwrap();
        let outcome = compiled.evaluate(&serde_json::json!("ok"));
        assert!(outcome.is_valid());
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn malformed_schema_text_fails_to_parse() {
        assert!(matches!(
            compile_plain(r#"{"type":"#),
            Err(EngineError::InvalidJson(_))
        ));
    }

    #[test]
    fn invalid_schema_fails_compile() {
        assert!(matches!(
            compile_plain(r#"{"type":"definitely-not-a-type"}"#),
            Err(EngineError::CompileFailed(_))
        ));
    }

    #[test]
    fn malformed_instance_is_an_error() {
        let compiled = compile_plain(STRING_SCHEMA).unwrap();
        assert!(matches!(
            compiled.validate_text("not-json", &EngineConfig::default()),
            Err(EngineError::InvalidJson(_))
        ));
    }

    #[test]
    fn unresolved_remote_reference_fails_compile() {
        assert!(matches!(
            compile_plain(REMOTE_REF_SCHEMA),
            Err(EngineError::CompileFailed(_))
        ));
    }

    #[test]
    fn host_resolver_supplies_remote_reference() {
        let resolver: Arc<dyn Resolver> = Arc::new(|uri: &str| {
            (uri == "https://example.com/schemas/integer.json")
                .then(|| r#"{"type":"integer"}"#.to_string())
        });
        let compiled = compile_text(
            REMOTE_REF_SCHEMA,
            Arc::new(SchemaStore::new()),
            Some(resolver),
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(compiled.is_valid(&serde_json::json!(42)));
        assert!(!compiled.is_valid(&serde_json::json!("nope")));
    }

    #[test]
    fn store_supplies_remote_reference_without_host_resolver() {
        let store = SchemaStore::new();
        store
            .register(
                "https://example.com/schemas/integer.json",
                r#"{"type":"integer"}"#,
            )
            .unwrap();

        let compiled =
            compile_text(REMOTE_REF_SCHEMA, Arc::new(store), None, &EngineConfig::default())
                .unwrap();
        assert!(compiled.is_valid(&serde_json::json!(7)));
    }

    #[test]
    fn host_resolver_is_consulted_for_nested_references() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let record = Arc::clone(&seen);
        let resolver: Arc<dyn Resolver> = Arc::new(move |uri: &str| {
            record.lock().unwrap().push(uri.to_string());
            match uri {
                "https://example.com/a.json" => {
                    Some(r#"{"$ref":"https://example.com/b.json"}"#.to_string())
                }
                "https://example.com/b.json" => Some(r#"{"type":"integer"}"#.to_string()),
                _ => None,
            }
        });

        let compiled = compile_text(
            r#"{"$ref":"https://example.com/a.json"}"#,
            Arc::new(SchemaStore::new()),
            Some(resolver),
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(compiled.is_valid(&serde_json::json!(1)));
        assert!(!compiled.is_valid(&serde_json::json!("x")));
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|uri| uri == "https://example.com/a.json"));
        assert!(seen.iter().any(|uri| uri == "https://example.com/b.json"));
    }

    #[test]
    fn default_dialect_applies_when_schema_has_none() {
        let config = EngineConfig::default()
            .with_default_dialect(Some("http://json-schema.org/draft-04/schema#"));
        let compiled = compile_text(
            r#"{"maximum":10,"exclusiveMaximum":true}"#,
            Arc::new(SchemaStore::new()),
            None,
            &config,
        )
        .unwrap();

        assert!(compiled.is_valid(&serde_json::json!(9)));
        assert!(!compiled.is_valid(&serde_json::json!(10)));
    }

    #[test]
    fn unknown_default_dialect_fails() {
        let config = EngineConfig::default().with_default_dialect(Some("urn:not-a-dialect"));
        let result = compile_text(STRING_SCHEMA, Arc::new(SchemaStore::new()), None, &config);
        assert!(matches!(result, Err(EngineError::UnknownDialect(_))));
    }

    #[test]
    fn fast_mode_reports_first_error_only() {
        let schema = r#"{
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" }
            }
        }"#;
        let instance = serde_json::json!({ "a": 1, "b": 2 });

        let exhaustive = compile_plain(schema).unwrap();
        assert_eq!(exhaustive.evaluate(&instance).errors().len(), 2);

        let fast = compile_text(
            schema,
            Arc::new(SchemaStore::new()),
            None,
            &EngineConfig::default().with_mode(Mode::FastValidation),
        )
        .unwrap();
        let outcome = fast.evaluate(&instance);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
    }

    #[test]
    fn nested_instance_location_is_reported() {
        let compiled =
            compile_plain(r#"{"type":"object","properties":{"id":{"type":"integer"}}}"#).unwrap();
        let outcome = compiled.evaluate(&serde_json::json!({ "id": "x" }));
        assert_eq!(outcome.errors()[0].instance_location, "/id");
    }
}
