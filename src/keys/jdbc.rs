//! Static source settings for JDBC sources

use super::{JobKeys, Keys};
use crate::config::{AnyProperty, ConfigSet, Property, PropertyCatalog};
use crate::diagnostics::Snapshot;
use eyre::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Case function applied to column names when inferring a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaRefactor {
    ToUpper,
    ToLower,
    #[default]
    None,
}

impl SchemaRefactor {
    pub fn apply(&self, column: &str) -> String {
        match self {
            Self::ToUpper => column.to_uppercase(),
            Self::ToLower => column.to_lowercase(),
            Self::None => column.to_string(),
        }
    }
}

impl FromStr for SchemaRefactor {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toupper" => Ok(Self::ToUpper),
            "tolower" => Ok(Self::ToLower),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SchemaRefactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToUpper => write!(f, "toupper"),
            Self::ToLower => write!(f, "tolower"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Settings a JDBC source resolves before running its statement
#[derive(Debug, Clone, PartialEq)]
pub struct JdbcKeys {
    job: JobKeys,
    statement: String,
    initial_parameter_values: Map<String, Value>,
    separator: char,
    quote_character: char,
    escape_character: char,
    schema_refactor: SchemaRefactor,
}

impl JdbcKeys {
    /// Resolve JDBC settings from the configuration
    ///
    /// # Errors
    /// Fails when no statement is configured; there is nothing to run.
    pub fn initialize(catalog: &PropertyCatalog, config: &ConfigSet) -> Result<Self> {
        let job = JobKeys::from_config(catalog, config);
        let keys = Self::from_job(job, catalog, config)?;
        keys.report_usage(catalog, config);
        keys.report_debug_snapshot(catalog, None);
        Ok(keys)
    }

    fn from_job(job: JobKeys, catalog: &PropertyCatalog, config: &ConfigSet) -> Result<Self> {
        if !catalog.jdbc_statement.is_valid_non_blank(config) {
            eyre::bail!(
                "Missing or invalid configuration in {}",
                catalog.jdbc_statement
            );
        }
        let statement = catalog.jdbc_statement.value_or_default(config);

        let schema_refactor = {
            let raw = catalog.jdbc_schema_refactor.value_or_default(config);
            raw.parse().unwrap_or_else(|_| {
                log::warn!(
                    "Unknown schema refactor function '{}' in {}, using none",
                    raw,
                    catalog.jdbc_schema_refactor
                );
                SchemaRefactor::None
            })
        };

        Ok(Self {
            initial_parameter_values: initial_values(
                &catalog.parameters.value_or_default(config),
            ),
            separator: csv_character(&catalog.csv_separator, config),
            quote_character: csv_character(&catalog.csv_quote_character, config),
            escape_character: csv_character(&catalog.csv_escape_character, config),
            job,
            statement,
            schema_refactor,
        })
    }

    pub fn job(&self) -> &JobKeys {
        &self.job
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Values bound to the statement's parameters on the first query
    pub fn initial_parameter_values(&self) -> &Map<String, Value> {
        &self.initial_parameter_values
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn quote_character(&self) -> char {
        self.quote_character
    }

    pub fn escape_character(&self) -> char {
        self.escape_character
    }

    pub fn schema_refactor(&self) -> SchemaRefactor {
        self.schema_refactor
    }
}

impl Keys for JdbcKeys {
    fn essential_parameters<'c>(&self, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>> {
        let mut params = self.job.essential_parameters(catalog);
        params.extend([
            catalog.jdbc_statement.as_any(),
            catalog.source_conn_username.as_any(),
            catalog.source_conn_password.as_any(),
        ]);
        params
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new("JdbcKeys")
            .extend(self.job.snapshot())
            .field("JDBC statement", &self.statement)
            .field(
                "Initial values of dynamic parameters",
                Value::Object(self.initial_parameter_values.clone()),
            )
            .field("Separator", self.separator.escape_default())
            .field("Quote character", self.quote_character.escape_default())
            .field("Escape character", self.escape_character.escape_default())
            .field("Schema refactor function", self.schema_refactor)
    }
}

/// One entry of the `ms.parameters` array
#[derive(Debug, Deserialize)]
struct ParameterEntry {
    name: String,
    #[serde(default = "empty_value")]
    value: Value,
}

fn empty_value() -> Value {
    Value::String(String::new())
}

/// Collect `name -> value` from a `ms.parameters` style array
///
/// Entries without a string name are skipped. Entries without a value start
/// out as an empty string.
fn initial_values(parameters: &Value) -> Map<String, Value> {
    let Some(entries) = parameters.as_array() else {
        return Map::new();
    };

    entries
        .iter()
        .filter_map(|entry| ParameterEntry::deserialize(entry).ok())
        .map(|entry| (entry.name, entry.value))
        .collect()
}

/// Resolve a single CSV dialect character
///
/// Accepts one literal character, `\t`, or a `uXXXX` unicode escape. Anything
/// else keeps the descriptor's default.
fn csv_character(property: &Property<String>, config: &ConfigSet) -> char {
    let default = property.default_value().chars().next().unwrap_or(',');
    let raw = property.value_or_default(config);

    match parse_csv_character(&raw) {
        Some(c) => c,
        None => {
            log::warn!(
                "Property {} must be a single character, got '{}', using '{}'",
                property,
                raw,
                default.escape_default()
            );
            default
        }
    }
}

fn parse_csv_character(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => return Some(c),
        (None, _) => return None,
        _ => {}
    }

    if raw == "\\t" {
        return Some('\t');
    }

    raw.strip_prefix('u')
        .or_else(|| raw.strip_prefix("\\u"))
        .filter(|hex| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32)
}
