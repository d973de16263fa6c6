//! JSON Schema compilation for plugin manifests.
//!
//! The manifest schema ships inside the binary; this module parses it,
//! checks its `schema_version` const against the versions the loader
//! understands, and compiles a validator once.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

/// Controls how a schema is checked before compilation.
pub(crate) struct SchemaLoadOptions<'a> {
    /// Where to find the schema_version const inside the schema payload.
    pub schema_version_pointer: &'a str,
    /// Allowed schema_version values; enforced when present.
    pub allowed_versions: Option<&'a BTreeSet<String>>,
}

impl<'a> Default for SchemaLoadOptions<'a> {
    fn default() -> Self {
        Self {
            schema_version_pointer: "/properties/schema_version/const",
            allowed_versions: None,
        }
    }
}

pub(crate) fn compile_json_schema(
    raw: &str,
    origin: &str,
    options: SchemaLoadOptions<'_>,
) -> Result<SchemaLoadResult> {
    let schema: Value =
        serde_json::from_str(raw).with_context(|| format!("parsing schema {origin}"))?;

    let schema_version = extract_schema_version(&schema, options.schema_version_pointer)
        .ok_or_else(|| anyhow!("schema {origin} missing schema_version const"))?;

    if let Some(allowed) = options.allowed_versions {
        if !allowed.contains(&schema_version) {
            bail!(
                "schema_version '{}' not in allowed set {:?}",
                schema_version,
                allowed
            );
        }
    }

    // ValidationError borrows the schema; flatten it to text right away so
    // the compiled validator is the only thing that outlives this call.
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling schema {origin}: {err}"))?;

    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

/// Validate `instance`, returning every violation joined by newlines.
pub(crate) fn validation_errors(compiled: &JSONSchema, instance: &Value) -> Option<String> {
    match compiled.validate(instance) {
        Ok(()) => None,
        Err(errors) => Some(
            errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    }
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
