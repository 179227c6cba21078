//! Multistage Ingest
//!
//! Typed configuration properties and extraction state for a multi-stage
//! data ingestion framework

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod etl;
pub mod keys;
pub mod source;
pub mod transform;
pub mod work_unit;

// Re-exports for convenience
pub use config::{ConfigSet, Property, PropertyCatalog};
pub use etl::{StreamProcessor, Transformer};
pub use keys::{AvroExtractorKeys, ExtractorKeys, JdbcKeys, JobKeys, Keys};
pub use source::{Region, S3Keys};
pub use work_unit::WorkUnit;
