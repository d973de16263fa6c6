//! Plugin unit manifests (`<plugin dir>/<operation>/plugin.json`).
//!
//! A manifest is the loadable unit of a plugin directory: it declares which
//! linked symbols the unit exports. Manifests are validated against the
//! bundled `schema/plugin_manifest.schema.json` before they are trusted.

use crate::error::PluginLoadError;
use crate::schema_loader::{SchemaLoadOptions, compile_json_schema, validation_errors};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

pub const MANIFEST_FILE: &str = "plugin.json";
pub const MANIFEST_SCHEMA_VERSION: &str = "calc_plugin_v1";

const MANIFEST_SCHEMA: &str = include_str!("../schema/plugin_manifest.schema.json");

#[derive(Clone, Debug, Deserialize)]
pub struct PluginManifest {
    pub schema_version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub exports: Vec<String>,
}

/// Path of the manifest for a plugin subdirectory, if the unit exists.
pub fn manifest_path(unit_dir: &Path) -> Option<PathBuf> {
    let candidate = unit_dir.join(MANIFEST_FILE);
    candidate.is_file().then_some(candidate)
}

/// Read, schema-check, and decode a manifest.
pub fn load_manifest(path: &Path) -> Result<PluginManifest, PluginLoadError> {
    let data = fs::read_to_string(path).map_err(|err| PluginLoadError::Read {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;
    let value: Value = serde_json::from_str(&data).map_err(|err| PluginLoadError::Parse {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;

    let schema = manifest_schema().map_err(|details| PluginLoadError::Schema {
        path: path.to_path_buf(),
        details: details.to_string(),
    })?;
    if let Some(details) = validation_errors(schema, &value) {
        return Err(PluginLoadError::Schema {
            path: path.to_path_buf(),
            details,
        });
    }

    serde_json::from_value(value).map_err(|err| PluginLoadError::Parse {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

fn manifest_schema() -> Result<&'static JSONSchema, &'static str> {
    static SCHEMA: OnceLock<Result<JSONSchema, String>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let allowed = BTreeSet::from([MANIFEST_SCHEMA_VERSION.to_string()]);
            compile_json_schema(
                MANIFEST_SCHEMA,
                "schema/plugin_manifest.schema.json",
                SchemaLoadOptions {
                    allowed_versions: Some(&allowed),
                    ..Default::default()
                },
            )
            .map(|loaded| {
                debug!(schema_version = %loaded.schema_version, "compiled manifest schema");
                loaded.compiled
            })
            .map_err(|err| format!("{err:#}"))
        })
        .as_ref()
        .map_err(String::as_str)
}
