//! Extraction state ("keys")
//!
//! Keys are plain state structs owned by a single extractor or source:
//! - [`ExtractorKeys`]: run-level pagination, session and schema bookkeeping
//! - [`AvroExtractorKeys`]: Avro record cursor and schema state on top of the run keys
//! - [`JobKeys`]: static per-job settings
//! - [`JdbcKeys`]: JDBC statement and CSV dialect on top of the job keys
//!
//! Format-specific keys embed the keys they extend rather than sharing a
//! base type. What they do share is the [`Keys`] reporting contract.

mod avro;
mod extractor;
mod jdbc;
mod job;

pub use avro::{AvroExtractorKeys, RecordIterator};
pub use extractor::ExtractorKeys;
pub use jdbc::{JdbcKeys, SchemaRefactor};
pub use job::JobKeys;

use crate::config::{AnyProperty, ConfigSet, PropertyCatalog};
use crate::diagnostics::{self, Snapshot};
use crate::work_unit::WorkUnit;

/// Diagnostics contract shared by every keys type
pub trait Keys {
    /// Descriptors whose values are always surfaced for this keys type
    fn essential_parameters<'c>(&self, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>>;

    /// Capture every bookkeeping field for troubleshooting
    fn snapshot(&self) -> Snapshot;

    /// Log the resolved value of each essential parameter
    fn report_usage(&self, catalog: &PropertyCatalog, config: &ConfigSet) {
        diagnostics::log_usage(&self.essential_parameters(catalog), config);
    }

    /// Log the full snapshot, labelled with the work unit's dataset URN
    fn report_debug_snapshot(&self, catalog: &PropertyCatalog, work_unit: Option<&WorkUnit>) {
        let label = WorkUnit::label(work_unit, &catalog.dataset_urn);
        diagnostics::log_debug_snapshot(&self.snapshot(), &label);
    }
}
