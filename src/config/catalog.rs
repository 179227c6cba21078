//! The catalog of known configuration properties
//!
//! Built once at startup and passed by reference to whatever needs to read
//! configuration. It is immutable, so concurrent extraction runs can share one
//! catalog without synchronization.

use super::{AnyProperty, ConfigSet, Property};
use serde_json::{Value, json};

/// Default regular expression selecting every candidate file
pub const DEFAULT_FILES_PATTERN: &str = ".*";

/// All configuration properties understood by the framework
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCatalog {
    // Work unit identity
    pub dataset_urn: Property<String>,
    pub extract_table_name: Property<String>,

    // Job level settings shared by every source
    pub activation_property: Property<Value>,
    pub parameters: Property<Value>,
    pub data_field: Property<String>,
    pub total_count_field: Property<String>,
    pub session_key_field: Property<Value>,
    pub call_interval_millis: Property<i64>,
    pub work_unit_parallelism_max: Property<i64>,
    pub enable_cleansing: Property<bool>,

    // Connection
    pub source_uri: Property<String>,
    pub source_conn_username: Property<String>,
    pub source_conn_password: Property<String>,

    // Object storage
    pub source_s3_parameters: Property<Value>,
    pub source_files_pattern: Property<String>,
    pub s3_list_max_keys: Property<i64>,
    pub extractor_target_file_name: Property<String>,

    // JDBC
    pub jdbc_statement: Property<String>,
    pub jdbc_schema_refactor: Property<String>,
    pub csv_separator: Property<String>,
    pub csv_quote_character: Property<String>,
    pub csv_escape_character: Property<String>,
}

impl PropertyCatalog {
    pub fn new() -> Self {
        Self {
            dataset_urn: Property::new("dataset.urn"),
            extract_table_name: Property::new("extract.table.name"),

            activation_property: Property::new("ms.activation.property"),
            parameters: Property::with_default("ms.parameters", json!([])),
            data_field: Property::new("ms.data.field"),
            total_count_field: Property::new("ms.total.count.field"),
            session_key_field: Property::new("ms.session.key.field"),
            call_interval_millis: Property::<i64>::bounded(
                "ms.call.interval.millis",
                0,
                i64::MAX,
                0,
            ),
            work_unit_parallelism_max: Property::<i64>::bounded(
                "ms.work.unit.parallelism.max",
                0,
                5000,
                100,
            ),
            enable_cleansing: Property::with_default("ms.enable.cleansing", true),

            source_uri: Property::new("ms.source.uri"),
            source_conn_username: Property::new("source.conn.username"),
            source_conn_password: Property::<String>::new("source.conn.password").secret(),

            source_s3_parameters: Property::new("ms.source.s3.parameters"),
            source_files_pattern: Property::with_default(
                "ms.source.files.pattern",
                DEFAULT_FILES_PATTERN,
            ),
            s3_list_max_keys: Property::<i64>::bounded("ms.s3.list.max.keys", 1, 1000, 1000),
            extractor_target_file_name: Property::new("ms.extractor.target.file.name"),

            jdbc_statement: Property::new("ms.jdbc.statement"),
            jdbc_schema_refactor: Property::with_default("ms.jdbc.schema.refactor", "none"),
            csv_separator: Property::with_default("ms.csv.separator", ","),
            csv_quote_character: Property::with_default("ms.csv.quote.character", "\""),
            csv_escape_character: Property::with_default("ms.csv.escape.character", "\\"),
        }
    }

    /// Every descriptor in the catalog, in declaration order
    pub fn all(&self) -> Vec<AnyProperty<'_>> {
        vec![
            self.dataset_urn.as_any(),
            self.extract_table_name.as_any(),
            self.activation_property.as_any(),
            self.parameters.as_any(),
            self.data_field.as_any(),
            self.total_count_field.as_any(),
            self.session_key_field.as_any(),
            self.call_interval_millis.as_any(),
            self.work_unit_parallelism_max.as_any(),
            self.enable_cleansing.as_any(),
            self.source_uri.as_any(),
            self.source_conn_username.as_any(),
            self.source_conn_password.as_any(),
            self.source_s3_parameters.as_any(),
            self.source_files_pattern.as_any(),
            self.s3_list_max_keys.as_any(),
            self.extractor_target_file_name.as_any(),
            self.jdbc_statement.as_any(),
            self.jdbc_schema_refactor.as_any(),
            self.csv_separator.as_any(),
            self.csv_quote_character.as_any(),
            self.csv_escape_character.as_any(),
        ]
    }

    /// Look up a descriptor by its configuration key
    pub fn get(&self, key: &str) -> Option<AnyProperty<'_>> {
        self.all().into_iter().find(|p| p.key() == key)
    }

    /// Keys of every descriptor whose configured value is invalid
    ///
    /// Blank values are not reported; they resolve to defaults.
    pub fn invalid_keys(&self, config: &ConfigSet) -> Vec<&'static str> {
        self.all()
            .into_iter()
            .filter(|p| !p.is_valid(config))
            .map(|p| p.key())
            .collect()
    }

    /// Configured keys in the `ms.` namespace that no descriptor knows about
    ///
    /// These are usually typos, which would otherwise silently fall back to
    /// defaults.
    pub fn unknown_keys<'c>(&self, config: &'c ConfigSet) -> Vec<&'c str> {
        config
            .keys()
            .filter(|k| k.starts_with("ms.") && self.get(k).is_none())
            .collect()
    }
}

impl Default for PropertyCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let catalog = PropertyCatalog::new();
        let all = catalog.all();
        let keys: HashSet<&str> = all.iter().map(|p| p.key()).collect();
        assert_eq!(keys.len(), all.len());
    }

    #[test]
    fn test_defaults_are_valid_values() {
        let catalog = PropertyCatalog::new();
        for prop in catalog.all() {
            if let Some((min, max)) = prop.bounds() {
                let crate::config::PropertyValue::Integer(default) = prop.default_value() else {
                    panic!("{} is bounded but not an integer", prop.key());
                };
                assert!(min <= default && default <= max, "{}", prop.key());
            }
        }
    }

    #[test]
    fn test_get() {
        let catalog = PropertyCatalog::new();
        let prop = catalog.get("ms.s3.list.max.keys").unwrap();
        assert_eq!(prop.bounds(), Some((1, 1000)));
        assert!(catalog.get("ms.does.not.exist").is_none());
    }

    #[test]
    fn test_invalid_keys() {
        let catalog = PropertyCatalog::new();
        let config = ConfigSet::from_pairs([
            ("ms.s3.list.max.keys", "0"),
            ("ms.enable.cleansing", "maybe"),
            ("ms.source.uri", "https://bucket.s3.amazonaws.com"),
            ("ms.call.interval.millis", ""),
        ]);

        let invalid = catalog.invalid_keys(&config);
        assert_eq!(invalid, vec!["ms.enable.cleansing", "ms.s3.list.max.keys"]);
    }

    #[test]
    fn test_unknown_keys() {
        let catalog = PropertyCatalog::new();
        let config = ConfigSet::from_pairs([
            ("ms.source.uri", "https://bucket.s3.amazonaws.com"),
            ("ms.sorce.files.pattern", ".*csv"),
            ("job.name", "daily"),
        ]);

        assert_eq!(catalog.unknown_keys(&config), vec!["ms.sorce.files.pattern"]);
    }
}
