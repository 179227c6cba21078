//! Work unit context passed into diagnostics

use crate::config::{ConfigSet, Property};

/// Label used in diagnostics when no work unit is available
pub const PLACEHOLDER_LABEL: &str = "testing";

/// Identity of one unit of work handed to an extractor by the job framework
///
/// The core only reads properties from it, never writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkUnit {
    props: ConfigSet,
}

impl WorkUnit {
    pub fn new(props: ConfigSet) -> Self {
        Self { props }
    }

    pub fn props(&self) -> &ConfigSet {
        &self.props
    }

    /// Label identifying a work unit in log output
    ///
    /// Reads the dataset URN through the given descriptor and falls back to
    /// [`PLACEHOLDER_LABEL`] when there is no work unit or the URN is blank.
    pub fn label(work_unit: Option<&WorkUnit>, dataset_urn: &Property<String>) -> String {
        work_unit
            .filter(|wu| dataset_urn.is_valid_non_blank(&wu.props))
            .map(|wu| dataset_urn.value_or_default(&wu.props))
            .unwrap_or_else(|| PLACEHOLDER_LABEL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyCatalog;

    #[test]
    fn test_label_from_dataset_urn() {
        let catalog = PropertyCatalog::new();
        let wu = WorkUnit::new(ConfigSet::from_pairs([("dataset.urn", "orders-2024-01")]));
        assert_eq!(WorkUnit::label(Some(&wu), &catalog.dataset_urn), "orders-2024-01");
    }

    #[test]
    fn test_label_falls_back() {
        let catalog = PropertyCatalog::new();
        assert_eq!(WorkUnit::label(None, &catalog.dataset_urn), "testing");

        let blank = WorkUnit::new(ConfigSet::from_pairs([("dataset.urn", " ")]));
        assert_eq!(WorkUnit::label(Some(&blank), &catalog.dataset_urn), "testing");
    }
}
