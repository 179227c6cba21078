//! Job-level source settings

use super::Keys;
use crate::config::{AnyProperty, ConfigSet, PropertyCatalog};
use crate::diagnostics::Snapshot;
use serde_json::Value;

/// Static settings resolved once per job and shared by every source type
///
/// Unlike [`ExtractorKeys`](super::ExtractorKeys), these do not change while
/// a run pages through its source.
#[derive(Debug, Clone, PartialEq)]
pub struct JobKeys {
    source_uri: String,
    data_field: String,
    total_count_field: String,
    session_key_field: Value,
    call_interval_millis: i64,
    work_unit_parallelism_max: i64,
    enable_cleansing: bool,
}

impl JobKeys {
    /// Resolve job settings, falling back to defaults for anything blank or invalid
    pub fn from_config(catalog: &PropertyCatalog, config: &ConfigSet) -> Self {
        Self {
            source_uri: catalog.source_uri.value_or_default(config),
            data_field: catalog.data_field.value_or_default(config),
            total_count_field: catalog.total_count_field.value_or_default(config),
            session_key_field: catalog.session_key_field.value_or_default(config),
            call_interval_millis: catalog.call_interval_millis.value_or_default(config),
            work_unit_parallelism_max: catalog.work_unit_parallelism_max.value_or_default(config),
            enable_cleansing: catalog.enable_cleansing.value_or_default(config),
        }
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    /// JSON path of the records inside a response, empty when the response is the records
    pub fn data_field(&self) -> &str {
        &self.data_field
    }

    pub fn total_count_field(&self) -> &str {
        &self.total_count_field
    }

    pub fn session_key_field(&self) -> &Value {
        &self.session_key_field
    }

    /// Name of the session key inside the response, if one is configured
    pub fn session_key_name(&self) -> Option<&str> {
        self.session_key_field.get("name").and_then(|v| v.as_str())
    }

    pub fn call_interval_millis(&self) -> i64 {
        self.call_interval_millis
    }

    pub fn work_unit_parallelism_max(&self) -> i64 {
        self.work_unit_parallelism_max
    }

    pub fn enable_cleansing(&self) -> bool {
        self.enable_cleansing
    }
}

impl Keys for JobKeys {
    fn essential_parameters<'c>(&self, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>> {
        vec![
            catalog.source_uri.as_any(),
            catalog.session_key_field.as_any(),
            catalog.work_unit_parallelism_max.as_any(),
        ]
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new("JobKeys")
            .field("Source URI", &self.source_uri)
            .field("Data field", &self.data_field)
            .field("Total count field", &self.total_count_field)
            .field("Session key field", &self.session_key_field)
            .field("Call interval (ms)", self.call_interval_millis)
            .field("Work unit parallelism max", self.work_unit_parallelism_max)
            .field("Enable cleansing", self.enable_cleansing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let catalog = PropertyCatalog::new();
        let keys = JobKeys::from_config(&catalog, &ConfigSet::new());

        assert_eq!(keys.source_uri(), "");
        assert_eq!(keys.session_key_field(), &json!({}));
        assert_eq!(keys.session_key_name(), None);
        assert_eq!(keys.call_interval_millis(), 0);
        assert_eq!(keys.work_unit_parallelism_max(), 100);
        assert!(keys.enable_cleansing());
    }

    #[test]
    fn test_from_config() {
        let catalog = PropertyCatalog::new();
        let config = ConfigSet::from_pairs([
            ("ms.source.uri", "jdbc:mysql://db:3306/sales"),
            ("ms.data.field", "results"),
            ("ms.total.count.field", "meta.total"),
            ("ms.session.key.field", r#"{"name": "cursor"}"#),
            ("ms.call.interval.millis", "250"),
            ("ms.work.unit.parallelism.max", "9000"),
            ("ms.enable.cleansing", "false"),
        ]);
        let keys = JobKeys::from_config(&catalog, &config);

        assert_eq!(keys.source_uri(), "jdbc:mysql://db:3306/sales");
        assert_eq!(keys.data_field(), "results");
        assert_eq!(keys.total_count_field(), "meta.total");
        assert_eq!(keys.session_key_name(), Some("cursor"));
        assert_eq!(keys.call_interval_millis(), 250);
        // out of bounds falls back to the default
        assert_eq!(keys.work_unit_parallelism_max(), 100);
        assert!(!keys.enable_cleansing());
    }
}
