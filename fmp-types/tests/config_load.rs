use std::io::Write;
use std::path::PathBuf;

use fmp_types::{FmpConfig, FmpError, RetryConfig};

#[test]
fn json_file_with_only_apikey_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"apikey": "demo"}}"#).unwrap();

    let cfg = FmpConfig::from_json_file(file.path()).unwrap();
    assert_eq!(cfg.apikey, "demo");
    assert_eq!(cfg.base_url, fmp_types::DEFAULT_BASE_URL);
    assert_eq!(cfg.page_concurrency, 8);
    assert!(cfg.retry.is_none());
}

#[test]
fn json_file_overrides_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"apikey": "k", "page_concurrency": 2, "max_pages": 50,
            "retry": {{"max_attempts": 4, "min_backoff_ms": 10, "max_backoff_ms": 100,
                       "factor": 3, "jitter_percent": 0}}}}"#
    )
    .unwrap();

    let cfg = FmpConfig::from_json_file(file.path()).unwrap();
    assert_eq!(cfg.page_concurrency, 2);
    assert_eq!(cfg.max_pages, Some(50));
    assert_eq!(
        cfg.retry,
        Some(RetryConfig {
            max_attempts: 4,
            min_backoff_ms: 10,
            max_backoff_ms: 100,
            factor: 3,
            jitter_percent: 0,
        })
    );
}

#[test]
fn missing_file_is_config_error() {
    let err = FmpConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, FmpError::Config(_)));
}

#[test]
fn empty_key_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"apikey": "  "}}"#).unwrap();
    let err = FmpConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, FmpError::Config(_)));
}

#[test]
fn lookup_reads_key_and_database_path() {
    let cfg = FmpConfig::from_lookup(|k| match k {
        "FMP_API_KEY" => Some("abc".into()),
        "FMP_DATABASE_PATH" => Some("/tmp/fmp.sqlite".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.apikey, "abc");
    assert_eq!(cfg.database_path, Some(PathBuf::from("/tmp/fmp.sqlite")));
}

#[test]
fn lookup_without_key_fails() {
    let err = FmpConfig::from_lookup(|_| None).unwrap_err();
    assert!(matches!(err, FmpError::Config(msg) if msg.contains("FMP_API_KEY")));
}

#[test]
fn validate_rejects_zero_concurrency_and_zero_attempts() {
    let mut cfg = FmpConfig::new("k");
    cfg.page_concurrency = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = FmpConfig::new("k");
    cfg.retry = Some(RetryConfig {
        max_attempts: 0,
        ..RetryConfig::default()
    });
    assert!(cfg.validate().is_err());
}
