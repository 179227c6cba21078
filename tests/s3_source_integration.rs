//! Integration tests for object storage source initialization
//!
//! These tests load job configuration from real files and run the
//! initializer the way the CLI does.

use eyre::Result;
use multistage_ingest::cli::load_config;
use multistage_ingest::config::{ConfigSet, Property};
use multistage_ingest::source::DEFAULT_CONNECTION_TIMEOUT_SECS;
use multistage_ingest::{PropertyCatalog, Region, S3Keys};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_full_job_file() -> Result<()> {
    let file = write_config(&[
        "# nightly export",
        "ms.source.uri=https://my-bucket.s3.us-west-2.amazonaws.com/a%7Bb%7D/c",
        r#"ms.source.s3.parameters='{"region": "us-east-1", "connection_timeout": 30}'"#,
        r"ms.source.files.pattern='.*\.avro$'",
        "ms.s3.list.max.keys=500",
        "source.conn.username=AKIAEXAMPLE",
        "source.conn.password=not-a-real-secret",
    ]);

    let catalog = PropertyCatalog::new();
    let config = load_config(file.path())?;
    let keys = S3Keys::initialize(&catalog, &config)?;

    assert_eq!(keys.bucket(), "my-bucket");
    assert_eq!(keys.endpoint(), "https://s3.us-west-2.amazonaws.com");
    assert_eq!(keys.prefix(), "a{b}/c");
    assert_eq!(keys.region().id(), "us-east-1");
    assert_eq!(keys.connection_timeout(), 30);
    assert_eq!(keys.max_keys(), 500);
    assert_eq!(keys.access_key(), "AKIAEXAMPLE");
    assert!(keys.matches_file("a{b}/c/part-0001.avro"));
    assert!(!keys.matches_file("a{b}/c/_SUCCESS"));
    Ok(())
}

#[test]
fn test_missing_timeout_uses_default() -> Result<()> {
    let catalog = PropertyCatalog::new();
    let config = ConfigSet::from_pairs([
        ("ms.source.uri", "https://bucket.s3.amazonaws.com/data"),
        ("ms.source.s3.parameters", r#"{"region": "us-west-1"}"#),
    ]);

    let keys = S3Keys::initialize(&catalog, &config)?;
    assert_eq!(keys.connection_timeout(), DEFAULT_CONNECTION_TIMEOUT_SECS);
    Ok(())
}

#[test]
fn test_negative_timeout_fails() {
    let catalog = PropertyCatalog::new();
    let config = ConfigSet::from_pairs([
        ("ms.source.uri", "https://bucket.s3.amazonaws.com/data"),
        ("ms.source.s3.parameters", r#"{"connection_timeout": -5}"#),
    ]);

    let err = S3Keys::initialize(&catalog, &config).unwrap_err();
    assert_eq!(err.to_string(), "-5 is not a valid timeout value.");
}

#[test]
fn test_unknown_region_fails() {
    let catalog = PropertyCatalog::new();
    let config = ConfigSet::from_pairs([
        ("ms.source.uri", "https://bucket.s3.amazonaws.com/data"),
        ("ms.source.s3.parameters", r#"{"region": "mars-central-1"}"#),
    ]);

    let err = S3Keys::initialize(&catalog, &config).unwrap_err();
    assert!(err.to_string().contains("mars-central-1"));
    assert!(err.to_string().contains("not a valid S3 region"));
}

#[test]
fn test_region_defaults_to_us_west_2() -> Result<()> {
    let catalog = PropertyCatalog::new();
    let config = ConfigSet::from_pairs([("ms.source.uri", "https://bucket.s3.amazonaws.com/")]);

    let keys = S3Keys::initialize(&catalog, &config)?;
    assert_eq!(keys.region(), Region::US_WEST_2);
    Ok(())
}

#[test]
fn test_invalid_parameters_json_falls_back() -> Result<()> {
    let catalog = PropertyCatalog::new();
    let config = ConfigSet::from_pairs([
        ("ms.source.uri", "https://bucket.s3.amazonaws.com/"),
        ("ms.source.s3.parameters", "{region: eu-west-1"),
    ]);

    // malformed parameters are soft errors; the defaults apply
    let keys = S3Keys::initialize(&catalog, &config)?;
    assert_eq!(keys.region(), Region::US_WEST_2);
    assert_eq!(keys.connection_timeout(), DEFAULT_CONNECTION_TIMEOUT_SECS);
    Ok(())
}

#[test]
fn test_bounded_integer_scenario() {
    let prop = Property::<i64>::bounded("ms.test.limit", 0, 100, 0);
    let config = ConfigSet::from_pairs([("ms.test.limit", "150")]);

    assert!(!prop.is_valid(&config));
    assert_eq!(prop.value_or_default(&config), 0);
}

#[test]
fn test_catalog_shared_across_threads() {
    let catalog = std::sync::Arc::new(PropertyCatalog::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                let config = ConfigSet::from_pairs([
                    ("ms.source.uri", format!("https://bucket-{}.s3.amazonaws.com/p", i)),
                ]);
                S3Keys::initialize(&catalog, &config).map(|k| k.bucket().to_string())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let bucket = handle.join().unwrap().unwrap();
        assert_eq!(bucket, format!("bucket-{}", i));
    }
}
