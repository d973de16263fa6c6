//! Operation registry built by scanning a plugin directory.
//!
//! Every immediate subdirectory of the plugin root is a candidate unit. Its
//! manifest's exports are resolved against the linked symbol table and any
//! export implementing the capability contract is registered under the
//! *subdirectory* name, so the directory layout defines the operation
//! vocabulary. Rescans overwrite what they find and leave everything else in
//! place.

use crate::capability::Constructor;
use crate::error::PluginLoadError;
use crate::manifest::{load_manifest, manifest_path};
use crate::symbols::{Symbol, SymbolTable};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct CapabilityDescriptor {
    /// Operation name; the plugin subdirectory it came from.
    pub name: String,
    /// Exported symbol that satisfied the contract.
    pub symbol: String,
    /// Manifest the descriptor was loaded from.
    pub unit: PathBuf,
    pub constructor: Constructor,
}

/// What one `scan` pass did. Callers are free to ignore it; failures are
/// already logged.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub root_missing: bool,
    pub registered: Vec<String>,
    pub skipped: Vec<(String, PluginLoadError)>,
}

pub struct Registry {
    symbols: SymbolTable,
    by_name: HashMap<String, CapabilityDescriptor>,
    order: Vec<String>,
}

impl Registry {
    /// Empty registry over every symbol linked into this build, the same
    /// table `calc-worker` resolves against.
    pub fn linked() -> Self {
        Self {
            symbols: SymbolTable::linked(),
            by_name: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Convenience for `linked()` followed by one scan.
    pub fn load(directory: &Path) -> Self {
        let mut registry = Self::linked();
        registry.scan(directory);
        registry
    }

    /// Scan `directory` and register every unit that loads.
    ///
    /// Subdirectories are visited in sorted order so registration order (and
    /// therefore menu order) is stable across hosts.
    pub fn scan(&mut self, directory: &Path) -> ScanReport {
        let mut report = ScanReport::default();
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    plugin_dir = %directory.display(),
                    error = %err,
                    "plugin directory unavailable; no operations loaded"
                );
                report.root_missing = true;
                return report;
            }
        };

        let mut unit_dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        unit_dirs.sort();

        for unit_dir in unit_dirs {
            let Some(name) = unit_dir.file_name().and_then(|s| s.to_str()) else {
                debug!(path = %unit_dir.display(), "skipping non UTF-8 plugin directory");
                continue;
            };
            let name = name.to_string();
            let Some(manifest) = manifest_path(&unit_dir) else {
                debug!(operation = %name, "no plugin unit; skipping");
                continue;
            };

            match self.load_unit(&name, &manifest) {
                Ok(descriptor) => {
                    debug!(
                        operation = %name,
                        symbol = %descriptor.symbol,
                        unit = %descriptor.unit.display(),
                        "registered capability"
                    );
                    self.insert(descriptor);
                    report.registered.push(name);
                }
                Err(err) => {
                    warn!(operation = %name, error = %err, "failed to load plugin unit");
                    report.skipped.push((name, err));
                }
            }
        }

        info!(
            plugin_dir = %directory.display(),
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            "plugin scan complete"
        );
        report
    }

    /// Resolve one unit's exports.
    ///
    /// Every export must resolve in the linked table: a single unknown name
    /// fails the whole unit as an import failure, even when another export
    /// satisfies the contract. The contract marker is skipped. The last
    /// capability export wins.
    fn load_unit(
        &self,
        name: &str,
        unit: &Path,
    ) -> Result<CapabilityDescriptor, PluginLoadError> {
        let manifest = load_manifest(unit)?;

        let mut chosen: Option<(String, Constructor)> = None;
        for export in &manifest.exports {
            let symbol = self.symbols.resolve(export).ok_or_else(|| {
                PluginLoadError::UnknownSymbol {
                    path: unit.to_path_buf(),
                    symbol: export.clone(),
                }
            })?;
            let Symbol::Capability(constructor) = symbol else {
                continue;
            };
            if let Some((previous, _)) = &chosen {
                warn!(
                    operation = %name,
                    replaced = %previous,
                    symbol = %export,
                    "unit exports several capabilities; the last one wins"
                );
            }
            chosen = Some((export.clone(), constructor));
        }

        let (symbol, constructor) = chosen.ok_or_else(|| PluginLoadError::MissingContract {
            path: unit.to_path_buf(),
        })?;
        Ok(CapabilityDescriptor {
            name: name.to_string(),
            symbol,
            unit: unit.to_path_buf(),
            constructor,
        })
    }

    fn insert(&mut self, descriptor: CapabilityDescriptor) {
        if !self.by_name.contains_key(&descriptor.name) {
            self.order.push(descriptor.name.clone());
        }
        self.by_name.insert(descriptor.name.clone(), descriptor);
    }

    pub fn lookup(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names in first-registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
