//! Flat key-value configuration sets
//!
//! Every raw value is a string. Typed interpretation happens through
//! [`Property`](super::Property) descriptors.

use eyre::{Context, Result};
use serde_yaml::Value as YamlValue;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only mapping from configuration key to raw string value
///
/// The set is owned by the job that runs the extraction. Descriptors and
/// extraction keys only ever read from it.
///
/// # Example
/// ```
/// use multistage_ingest::config::ConfigSet;
///
/// let config = ConfigSet::from_pairs([("ms.source.uri", "https://bucket.s3.amazonaws.com/data")]);
/// assert_eq!(config.get("ms.source.uri"), Some("https://bucket.s3.amazonaws.com/data"));
/// assert!(config.get("ms.source.files.pattern").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSet {
    props: BTreeMap<String, String>,
}

impl ConfigSet {
    /// Create an empty configuration set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration set from key/value pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            props: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Read a dotenv style file of `key=value` lines
    ///
    /// Unquoted values are taken literally up to the end of the line, the way
    /// a properties file reads: no `$VAR` substitution, no escapes and no
    /// trailing comments. That keeps passwords and regular expressions such
    /// as `.*\.csv$` intact. Quoted values keep dotenv quoting rules and may
    /// span several lines, e.g. `ms.source.s3.parameters='{"region": "us-east-1"}'`.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open configuration file: {}", path.display()))?;
        let literal = quote_plain_values(&content);

        let mut props = BTreeMap::new();
        for item in dotenvy::from_read_iter(literal.as_bytes()) {
            let (key, value) = item.with_context(|| {
                format!("Failed to parse configuration file: {}", path.display())
            })?;
            props.insert(key, value);
        }

        Ok(Self { props })
    }

    /// Read a flat YAML mapping
    ///
    /// Scalars are stored as their plain string form. Nested mappings and
    /// sequences are stored as JSON text, which is what structured
    /// properties expect.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let mapping: BTreeMap<String, YamlValue> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration YAML: {}", path.display()))?;

        let mut props = BTreeMap::new();
        for (key, value) in mapping {
            let raw = match value {
                YamlValue::Null => String::new(),
                YamlValue::Bool(b) => b.to_string(),
                YamlValue::Number(n) => n.to_string(),
                YamlValue::String(s) => s,
                nested => {
                    let json: serde_json::Value = serde_yaml::from_value(nested)
                        .with_context(|| format!("Unsupported value for key '{}'", key))?;
                    json.to_string()
                }
            };
            props.insert(key, raw);
        }

        Ok(Self { props })
    }

    /// Get the raw value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(|s| s.as_str())
    }

    /// Check if the key is present, blank or not
    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    /// Set a raw value, replacing any previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    /// Iterate over all keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Wrap every unquoted value in quotes so dotenv parsing leaves it untouched
///
/// Lines inside a multi-line quoted value pass through as they are.
fn quote_plain_values(content: &str) -> String {
    let mut output = String::with_capacity(content.len() + 64);
    let mut open_quote: Option<char> = None;

    for line in content.lines() {
        match open_quote {
            Some(quote) => {
                if line.contains(quote) {
                    open_quote = None;
                }
                output.push_str(line);
            }
            None => output.push_str(&quote_line(line, &mut open_quote)),
        }
        output.push('\n');
    }

    output
}

fn quote_line<'a>(line: &'a str, open_quote: &mut Option<char>) -> Cow<'a, str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Cow::Borrowed(line);
    }
    let Some((key, value)) = line.split_once('=') else {
        return Cow::Borrowed(line);
    };

    let value = value.trim();
    match value.chars().next() {
        None => Cow::Borrowed(line),
        Some(quote @ ('\'' | '"')) => {
            if !value[1..].contains(quote) {
                *open_quote = Some(quote);
            }
            Cow::Borrowed(line)
        }
        // single quotes are fully literal but cannot hold a single quote
        _ if !value.contains('\'') => Cow::Owned(format!("{}='{}'", key, value)),
        _ => {
            let escaped = value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('$', "\\$");
            Cow::Owned(format!("{}=\"{}\"", key, escaped))
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_pairs() {
        let config = ConfigSet::from_pairs([("a", "1"), ("b", "")]);
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("a"), Some("1"));
        assert_eq!(config.get("b"), Some(""));
        assert!(config.contains("b"));
        assert!(!config.contains("c"));
    }

    #[test]
    fn test_from_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# job settings").unwrap();
        writeln!(file, "ms.source.uri=https://bucket.s3.amazonaws.com/a").unwrap();
        writeln!(file, r#"ms.source.s3.parameters='{{"region": "us-east-1"}}'"#).unwrap();
        writeln!(file, "ms.s3.list.max.keys=100").unwrap();

        let config = ConfigSet::from_env_file(file.path()).unwrap();
        assert_eq!(config.len(), 3);
        assert_eq!(
            config.get("ms.source.uri"),
            Some("https://bucket.s3.amazonaws.com/a")
        );
        assert_eq!(
            config.get("ms.source.s3.parameters"),
            Some(r#"{"region": "us-east-1"}"#)
        );
        assert_eq!(config.get("ms.s3.list.max.keys"), Some("100"));
    }

    #[test]
    fn test_from_env_file_keeps_unquoted_values_literal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "source.conn.password=pa$sword").unwrap();
        writeln!(file, r"ms.source.files.pattern=.*\.csv$").unwrap();
        writeln!(file, "extract.table.name=o'brien $HOME").unwrap();
        writeln!(file, r#"ms.jdbc.statement=select "id" from t where a = 'x\y'"#).unwrap();

        let config = ConfigSet::from_env_file(file.path()).unwrap();
        assert_eq!(config.get("source.conn.password"), Some("pa$sword"));
        assert_eq!(config.get("ms.source.files.pattern"), Some(r".*\.csv$"));
        assert_eq!(config.get("extract.table.name"), Some("o'brien $HOME"));
        assert_eq!(
            config.get("ms.jdbc.statement"),
            Some(r#"select "id" from t where a = 'x\y'"#)
        );
    }

    #[test]
    fn test_quote_plain_values() {
        let quoted = quote_plain_values(
            "# comment\n\nms.a=x$y\nms.b='kept'\nms.c='{\n  \"k\": 1\n}'\nms.d=1\n",
        );
        assert_eq!(
            quoted,
            "# comment\n\nms.a='x$y'\nms.b='kept'\nms.c='{\n  \"k\": 1\n}'\nms.d='1'\n"
        );
    }

    #[test]
    fn test_from_env_file_missing() {
        let result = ConfigSet::from_env_file("/nonexistent/job.env");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "ms.source.uri: https://bucket.s3.amazonaws.com/a\n\
             ms.s3.list.max.keys: 250\n\
             ms.enable.cleansing: false\n\
             ms.source.s3.parameters:\n  region: eu-west-1\n"
        )
        .unwrap();

        let config = ConfigSet::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.get("ms.s3.list.max.keys"), Some("250"));
        assert_eq!(config.get("ms.enable.cleansing"), Some("false"));

        let params: serde_json::Value =
            serde_json::from_str(config.get("ms.source.s3.parameters").unwrap()).unwrap();
        assert_eq!(params["region"], "eu-west-1");
    }
}
