//! Run-level extraction state shared by every extractor

use super::Keys;
use crate::config::{AnyProperty, PropertyCatalog};
use crate::diagnostics::Snapshot;
use crate::etl::StreamProcessor;
use chrono::{DateTime, Utc};
use eyre::Result;
use serde_json::{Map, Value};

/// Bookkeeping for one extraction run
///
/// Each extractor populates these keys as it pages through a source so the
/// framework driving it can read back progress, session state and the
/// inferred schema. One instance belongs to exactly one run and is mutated
/// only by the extractor that owns it.
pub struct ExtractorKeys {
    activation_parameters: Map<String, Value>,
    start_time: DateTime<Utc>,
    delay_start_time: i64,
    signature: Option<String>,
    inferred_schema: Option<Vec<Value>>,
    session_key_value: Option<String>,
    preprocessors: Vec<Box<StreamProcessor>>,
    dynamic_parameters: Map<String, Value>,
    explicit_eof: Option<bool>,
    payloads: Vec<Value>,
    processed_count: u64,
}

impl ExtractorKeys {
    /// Create keys for a run starting now
    pub fn new() -> Self {
        Self {
            activation_parameters: Map::new(),
            start_time: Utc::now(),
            delay_start_time: 0,
            signature: None,
            inferred_schema: None,
            session_key_value: None,
            preprocessors: Vec::new(),
            dynamic_parameters: Map::new(),
            explicit_eof: None,
            payloads: Vec::new(),
            processed_count: 0,
        }
    }

    /// Count one more record emitted
    pub fn record_processed(&mut self) {
        self.processed_count += 1;
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn activation_parameters(&self) -> &Map<String, Value> {
        &self.activation_parameters
    }

    pub fn set_activation_parameters(&mut self, parameters: Map<String, Value>) {
        self.activation_parameters = parameters;
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn set_start_time(&mut self, start_time: DateTime<Utc>) {
        self.start_time = start_time;
    }

    /// Delay before the first request, in milliseconds
    pub fn delay_start_time(&self) -> i64 {
        self.delay_start_time
    }

    pub fn set_delay_start_time(&mut self, millis: i64) {
        self.delay_start_time = millis;
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Assign the run signature
    ///
    /// The signature identifies the run for resume and dedup, so it can be
    /// set only once. Returns false, keeping the existing signature, on any
    /// later attempt.
    pub fn assign_signature(&mut self, signature: impl Into<String>) -> bool {
        match &self.signature {
            Some(existing) => {
                log::warn!(
                    "Signature already assigned as '{}', ignoring '{}'",
                    existing,
                    signature.into()
                );
                false
            }
            None => {
                self.signature = Some(signature.into());
                true
            }
        }
    }

    pub fn inferred_schema(&self) -> Option<&[Value]> {
        self.inferred_schema.as_deref()
    }

    pub fn set_inferred_schema(&mut self, schema: Vec<Value>) {
        self.inferred_schema = Some(schema);
    }

    /// Session token or continuation cursor last reported by the source
    pub fn session_key_value(&self) -> Option<&str> {
        self.session_key_value.as_deref()
    }

    pub fn set_session_key_value(&mut self, value: impl Into<String>) {
        self.session_key_value = Some(value.into());
    }

    pub fn preprocessors(&self) -> &[Box<StreamProcessor>] {
        &self.preprocessors
    }

    /// Append a stage to the end of the preprocessing chain
    pub fn add_preprocessor(&mut self, processor: Box<StreamProcessor>) {
        self.preprocessors.push(processor);
    }

    /// Run bytes through every preprocessor in registration order
    pub fn preprocess(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        self.preprocessors
            .iter()
            .try_fold(bytes, |acc, processor| processor.transform(acc))
    }

    pub fn dynamic_parameters(&self) -> &Map<String, Value> {
        &self.dynamic_parameters
    }

    /// Merge values into the parameters used by subsequent requests
    ///
    /// Later values replace earlier ones with the same name.
    pub fn merge_dynamic_parameters(&mut self, values: Map<String, Value>) {
        self.dynamic_parameters.extend(values);
    }

    /// Whether the source explicitly signalled end of data
    ///
    /// `None` until the source says either way.
    pub fn explicit_eof(&self) -> Option<bool> {
        self.explicit_eof
    }

    pub fn set_explicit_eof(&mut self, eof: bool) {
        self.explicit_eof = Some(eof);
    }

    pub fn payloads(&self) -> &[Value] {
        &self.payloads
    }

    pub fn push_payload(&mut self, payload: Value) {
        self.payloads.push(payload);
    }

    /// Take all buffered payloads, leaving the buffer empty
    pub fn drain_payloads(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.payloads)
    }
}

impl Default for ExtractorKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl Keys for ExtractorKeys {
    fn essential_parameters<'c>(&self, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>> {
        vec![
            catalog.extract_table_name.as_any(),
            catalog.activation_property.as_any(),
            catalog.parameters.as_any(),
        ]
    }

    fn snapshot(&self) -> Snapshot {
        let preprocessors: Vec<&str> = self.preprocessors.iter().map(|p| p.name()).collect();

        Snapshot::new("ExtractorKeys")
            .field("Activation parameters", Value::Object(self.activation_parameters.clone()))
            .field("Payload size", self.payloads.len())
            .field("Starting time", self.start_time.to_rfc3339())
            .field("Delay starting time", self.delay_start_time)
            .optional("Signature of the work unit", self.signature.as_deref())
            .optional(
                "Inferred schema",
                self.inferred_schema
                    .as_ref()
                    .map(|s| Value::Array(s.clone())),
            )
            .optional("Session status", self.session_key_value.as_deref())
            .field("Dynamic parameters", Value::Object(self.dynamic_parameters.clone()))
            .optional("Explicit EOF", self.explicit_eof)
            .field("Preprocessors", preprocessors.join(", "))
            .field("Total rows processed", self.processed_count)
    }
}
