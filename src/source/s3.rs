//! Object storage source settings
//!
//! [`S3Keys::initialize`] validates everything an object storage connector
//! needs before it opens a connection. A bucket URI such as
//! `https://my-bucket.s3.us-west-2.amazonaws.com/exports/{{date}}` yields:
//! - bucket `my-bucket`
//! - endpoint `https://s3.us-west-2.amazonaws.com`
//! - prefix `exports/{{date}}`

use super::Region;
use crate::config::{AnyProperty, ConfigSet, PropertyCatalog};
use crate::diagnostics::{self, Snapshot};
use crate::keys::{JobKeys, Keys};
use eyre::{Context, Result};
use regex::Regex;
use serde_json::Value;
use url::Url;

const KEY_REGION: &str = "region";
const KEY_CONNECTION_TIMEOUT: &str = "connection_timeout";

/// Connection timeout used when the source parameters declare none
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 60;

/// Validated settings for an object storage source
///
/// Bucket and endpoint are always derived from the one validated source URI,
/// so there is no way to set them independently.
#[derive(Debug, Clone)]
pub struct S3Keys {
    job: JobKeys,
    region: Region,
    connection_timeout: u64,
    endpoint: String,
    prefix: String,
    bucket: String,
    files_pattern: Regex,
    max_keys: i64,
    access_key: String,
    secret_id: String,
    target_file_pattern: String,
}

impl S3Keys {
    /// Validate the configuration and assemble object storage settings
    ///
    /// # Errors
    /// Fails before any derived field is computed when:
    /// - the source URI does not parse or has no host
    /// - the source parameters declare an unknown region
    /// - the source parameters declare a non-positive connection timeout
    /// - the host has no label besides the bucket name
    /// - the files pattern is not a valid regular expression
    pub fn initialize(catalog: &PropertyCatalog, config: &ConfigSet) -> Result<Self> {
        let job = JobKeys::from_config(catalog, config);
        diagnostics::log_usage(&Self::essentials(&job, catalog), config);

        let raw_uri = catalog.source_uri.value_or_default(config);
        let url = Url::parse(&raw_uri).with_context(|| {
            format!(
                "Incorrect configuration in {}: '{}'",
                catalog.source_uri, raw_uri
            )
        })?;
        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => eyre::bail!(
                "Incorrect configuration in {}: '{}' has no host",
                catalog.source_uri,
                raw_uri
            ),
        };

        let parameters = catalog.source_s3_parameters.value_or_default(config);
        let region = region_from(&parameters)?;
        let connection_timeout = connection_timeout_from(&parameters)?;

        let (bucket, endpoint_host) = split_host(host)?;
        let prefix = decode_prefix(url.path())?;

        let raw_pattern = catalog.source_files_pattern.value_or_default(config);
        let files_pattern = Regex::new(&raw_pattern).with_context(|| {
            format!(
                "Incorrect configuration in {}: '{}' is not a valid regular expression",
                catalog.source_files_pattern, raw_pattern
            )
        })?;

        let keys = Self {
            job,
            region,
            connection_timeout,
            endpoint: format!("https://{}", endpoint_host),
            prefix,
            bucket: bucket.to_string(),
            files_pattern,
            max_keys: catalog.s3_list_max_keys.value_or_default(config),
            access_key: catalog.source_conn_username.value_or_default(config),
            secret_id: catalog.source_conn_password.value_or_default(config),
            target_file_pattern: catalog.extractor_target_file_name.value_or_default(config),
        };

        keys.report_debug_snapshot(catalog, None);
        Ok(keys)
    }

    /// Job essentials plus the object storage settings
    ///
    /// Takes the job keys rather than `&self` so usage can be reported before
    /// validation has a chance to fail.
    fn essentials<'c>(job: &JobKeys, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>> {
        let mut params = job.essential_parameters(catalog);
        params.extend([
            catalog.source_s3_parameters.as_any(),
            catalog.source_files_pattern.as_any(),
            catalog.s3_list_max_keys.as_any(),
        ]);
        params
    }

    pub fn job(&self) -> &JobKeys {
        &self.job
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Connection timeout in seconds
    pub fn connection_timeout(&self) -> u64 {
        self.connection_timeout
    }

    /// Endpoint URL without the bucket name
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Percent-decoded object key prefix; may hold parameter placeholders
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn files_pattern(&self) -> &Regex {
        &self.files_pattern
    }

    /// Check an object key against the files pattern
    pub fn matches_file(&self, object_key: &str) -> bool {
        self.files_pattern.is_match(object_key)
    }

    /// Page size for bucket listings
    pub fn max_keys(&self) -> i64 {
        self.max_keys
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// Rename template for extracted files, empty to keep the object name
    pub fn target_file_pattern(&self) -> &str {
        &self.target_file_pattern
    }
}

impl Keys for S3Keys {
    fn essential_parameters<'c>(&self, catalog: &'c PropertyCatalog) -> Vec<AnyProperty<'c>> {
        Self::essentials(&self.job, catalog)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new("S3Keys")
            .extend(self.job.snapshot())
            .field("Region", self.region)
            .field("Connection timeout (s)", self.connection_timeout)
            .field("Endpoint", &self.endpoint)
            .field("Bucket", &self.bucket)
            .field("Prefix", &self.prefix)
            .field("Files pattern", self.files_pattern.as_str())
            .field("Max keys", self.max_keys)
            .field("Access key", &self.access_key)
            .secret("Secret id", &self.secret_id)
            .field("Target file pattern", &self.target_file_pattern)
    }
}

fn region_from(parameters: &Value) -> Result<Region> {
    match parameters.get(KEY_REGION) {
        None => Ok(Region::default()),
        Some(Value::String(id)) => id
            .parse()
            .map_err(|_| eyre::eyre!("{} is not a valid S3 region.", id)),
        Some(other) => eyre::bail!("{} is not a valid S3 region.", other),
    }
}

fn connection_timeout_from(parameters: &Value) -> Result<u64> {
    let Some(raw) = parameters.get(KEY_CONNECTION_TIMEOUT) else {
        return Ok(DEFAULT_CONNECTION_TIMEOUT_SECS);
    };

    let timeout = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match timeout.and_then(|t| u64::try_from(t).ok()) {
        Some(t) if t > 0 => Ok(t),
        _ => eyre::bail!("{} is not a valid timeout value.", raw),
    }
}

/// Split `bucket.endpoint.host` into the bucket and the endpoint host
fn split_host(host: &str) -> Result<(&str, &str)> {
    match host.split_once('.') {
        Some((bucket, endpoint)) if !bucket.is_empty() && !endpoint.is_empty() => {
            Ok((bucket, endpoint))
        }
        _ => eyre::bail!("Host name format is incorrect: '{}'", host),
    }
}

/// Strip the leading separator and undo the URL parser's percent-encoding
///
/// Placeholders like `{{date}}` come back out of the parser as `%7B%7Bdate%7D%7D`.
fn decode_prefix(encoded_path: &str) -> Result<String> {
    let path = encoded_path.strip_prefix('/').unwrap_or(encoded_path);
    let decoded = urlencoding::decode(path)
        .with_context(|| format!("Failed to decode path '{}'", encoded_path))?;
    Ok(decoded.into_owned())
}
