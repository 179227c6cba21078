//! Diagnostic output for configuration and extraction state
//!
//! Everything here takes plain values in and produces log lines. Nothing
//! reads or mutates extraction state directly, so reports can be built and
//! tested apart from the code they describe.

use crate::config::{AnyProperty, ConfigSet};
use std::fmt;

const MASK: &str = "********";

/// An ordered set of named field values captured from one state object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    title: String,
    fields: Vec<(&'static str, String)>,
}

impl Snapshot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Append one field
    pub fn field(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    /// Append an optional field, rendering `None` as `-`
    pub fn optional(self, name: &'static str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self.field(name, "-"),
        }
    }

    /// Append a credential, masked unless empty
    pub fn secret(self, name: &'static str, value: &str) -> Self {
        if value.is_empty() {
            self.field(name, "")
        } else {
            self.field(name, MASK)
        }
    }

    /// Append every field of a nested snapshot, keeping this title
    pub fn extend(mut self, other: Snapshot) -> Self {
        self.fields.extend(other.fields);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Render the resolved value of each descriptor as one line
pub fn usage_lines(properties: &[AnyProperty<'_>], config: &ConfigSet) -> Vec<String> {
    properties
        .iter()
        .map(|p| {
            let value = if p.is_secret() && !p.is_blank(config) {
                MASK.to_string()
            } else {
                p.resolve(config).to_string()
            };
            format!("Property {} ({}) has value {}", p.key(), p.kind(), value)
        })
        .collect()
}

/// Log the resolved value of each descriptor at info level
pub fn log_usage(properties: &[AnyProperty<'_>], config: &ConfigSet) {
    for line in usage_lines(properties, config) {
        log::info!("{}", line);
    }
}

/// Render a snapshot as log lines, headed by the work unit label
pub fn snapshot_lines(snapshot: &Snapshot, label: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.fields.len() + 1);
    lines.push(format!(
        "These are values in {} regarding to work unit: {}",
        snapshot.title, label
    ));
    lines.extend(
        snapshot
            .fields
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value)),
    );
    lines
}

/// Log a snapshot at debug level
pub fn log_debug_snapshot(snapshot: &Snapshot, label: &str) {
    for line in snapshot_lines(snapshot, label) {
        log::debug!("{}", line);
    }
}
