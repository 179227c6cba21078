//! Extraction state for Avro container streams

use super::{ExtractorKeys, Keys};
use crate::config::{AnyProperty, PropertyCatalog};
use crate::diagnostics::Snapshot;
use apache_avro::types::Value;
use apache_avro::{AvroResult, Schema};

/// Forward-only cursor over decoded Avro records
pub type RecordIterator = Box<dyn Iterator<Item = AvroResult<Value>>>;

/// Keys maintained by the Avro extractor on top of the run-level keys
pub struct AvroExtractorKeys {
    base: ExtractorKeys,
    record_iterator: Option<RecordIterator>,
    total_count: u64,
    current_page_number: u64,
    output_schema: Option<Schema>,
    is_valid_output_schema: bool,
    sample_data: Option<Value>,
}

impl AvroExtractorKeys {
    pub fn new() -> Self {
        Self::with_base(ExtractorKeys::new())
    }

    pub fn with_base(base: ExtractorKeys) -> Self {
        Self {
            base,
            record_iterator: None,
            total_count: 0,
            current_page_number: 0,
            output_schema: None,
            is_valid_output_schema: true,
            sample_data: None,
        }
    }

    pub fn base(&self) -> &ExtractorKeys {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ExtractorKeys {
        &mut self.base
    }

    /// Count one more page fetched
    ///
    /// Call once per successful page fetch, before requesting the next page.
    pub fn advance_page(&mut self) {
        self.current_page_number += 1;
    }

    /// Pages fetched so far
    pub fn current_page_number(&self) -> u64 {
        self.current_page_number
    }

    /// Replace the record cursor with the one decoded from the latest page
    pub fn set_record_iterator(&mut self, iterator: RecordIterator) {
        self.record_iterator = Some(iterator);
    }

    pub fn has_record_iterator(&self) -> bool {
        self.record_iterator.is_some()
    }

    /// Pull the next record from the current cursor
    ///
    /// The first record decoded is kept as sample data and every decoded
    /// record counts as processed. The cursor is dropped once exhausted.
    pub fn next_record(&mut self) -> Option<AvroResult<Value>> {
        let next = self.record_iterator.as_mut()?.next();
        match next {
            Some(Ok(record)) => {
                if self.sample_data.is_none() {
                    self.sample_data = Some(record.clone());
                }
                self.base.record_processed();
                Some(Ok(record))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                self.record_iterator = None;
                None
            }
        }
    }

    /// Declared total number of records, if the source reports one
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
    }

    /// The writer schema resolved for the output
    ///
    /// Check [`is_valid_output_schema`](Self::is_valid_output_schema) before
    /// relying on it.
    pub fn output_schema(&self) -> Option<&Schema> {
        self.output_schema.as_ref()
    }

    pub fn set_output_schema(&mut self, schema: Schema) {
        self.output_schema = Some(schema);
        self.is_valid_output_schema = true;
    }

    pub fn is_valid_output_schema(&self) -> bool {
        self.is_valid_output_schema
    }

    /// Flag the output schema as unusable
    pub fn invalidate_output_schema(&mut self) {
        self.is_valid_output_schema = false;
    }

    pub fn sample_data(&self) -> Option<&Value> {
        self.sample_data.as_ref()
    }
}

impl Default for AvroExtractorKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl Keys for AvroExtractorKeys {
    fn essential_parameters<'c>(&self, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>> {
        let mut params = self.base.essential_parameters(catalog);
        params.extend([catalog.data_field.as_any(), catalog.total_count_field.as_any()]);
        params
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new("AvroExtractorKeys")
            .extend(self.base.snapshot())
            .field("Total rows expected or processed", self.total_count)
            .field("Current page number", self.current_page_number)
            .optional(
                "Output schema",
                self.output_schema.as_ref().map(|s| s.canonical_form()),
            )
            .field("Valid output schema", self.is_valid_output_schema)
            .field("Has sample data", self.sample_data.is_some())
    }
}
