//! CLI helper functions

use crate::{
    config::{ConfigSet, PropertyCatalog},
    diagnostics::Snapshot,
    keys::{JdbcKeys, Keys},
    source::S3Keys,
};
use clap::ValueEnum;
use eyre::{Context, Result};
use std::path::Path;

/// Source types the CLI can initialize
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    S3,
    Jdbc,
}

/// Outcome of checking a configuration against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Keys whose values fail to parse or fall out of bounds
    pub invalid: Vec<&'static str>,
    /// `ms.` keys no descriptor knows about
    pub unknown: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty() && self.unknown.is_empty()
    }
}

/// Load a configuration file
///
/// `.yml` and `.yaml` files are read as flat YAML mappings; anything else is
/// read as `key=value` lines.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigSet> {
    let path = path.as_ref();
    if !path.exists() {
        eyre::bail!("Configuration file not found: {}", path.display());
    }

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"));

    let config = if is_yaml {
        ConfigSet::from_yaml_file(path)?
    } else {
        ConfigSet::from_env_file(path)?
    };

    log::info!("Loaded {} properties from {}", config.len(), path.display());
    Ok(config)
}

/// Validate every property in the configuration without failing
pub fn check_properties(catalog: &PropertyCatalog, config: &ConfigSet) -> CheckReport {
    let invalid = catalog.invalid_keys(config);
    let unknown: Vec<String> = catalog
        .unknown_keys(config)
        .into_iter()
        .map(|k| k.to_string())
        .collect();

    for key in &unknown {
        log::warn!("Unknown property {} will be ignored", key);
    }

    CheckReport { invalid, unknown }
}

/// Run a source initializer and return a snapshot of the settings it produced
pub fn initialize_source(
    kind: SourceKind,
    catalog: &PropertyCatalog,
    config: &ConfigSet,
) -> Result<Snapshot> {
    let snapshot = match kind {
        SourceKind::S3 => S3Keys::initialize(catalog, config)
            .with_context(|| "Failed to initialize object storage source")?
            .snapshot(),
        SourceKind::Jdbc => JdbcKeys::initialize(catalog, config)
            .with_context(|| "Failed to initialize JDBC source")?
            .snapshot(),
    };
    Ok(snapshot)
}

/// One line per catalog entry: key, kind, default and integer bounds
pub fn describe_catalog(catalog: &PropertyCatalog) -> Vec<String> {
    catalog
        .all()
        .into_iter()
        .map(|p| {
            let bounds = match p.bounds() {
                Some((min, max)) => format!(" [{}, {}]", min, max),
                None => String::new(),
            };
            format!(
                "{} ({}) default: {}{}",
                p.key(),
                p.kind(),
                p.default_value(),
                bounds
            )
        })
        .collect()
}
