//! Configuration properties
//!
//! This module provides:
//! - [`ConfigSet`]: the flat, string-valued configuration supplied by a job
//! - [`Property`]: typed, bounded descriptors that validate and extract values
//! - [`PropertyCatalog`]: the immutable catalog of every known property

mod catalog;
mod property;
mod set;

pub use catalog::{DEFAULT_FILES_PATTERN, PropertyCatalog};
pub use property::{AnyProperty, Property, PropertyKind, PropertyType, PropertyValue};
pub use set::ConfigSet;
