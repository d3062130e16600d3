/*!
 * Tests for application configuration
 */

use anyhow::Result;
use podscript::app_config::{Config, LogLevel};
use crate::common;

#[test]
fn test_default_config_shouldBeValid() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert!(!config.include_timestamps);
    assert!(config.skip_existing);
    assert_eq!(config.identifier_prefix, "PodcastContent");
    assert!(config.ttml_dir.ends_with("Library/Cache/Assets/TTML"));
    assert!(config.database_path.ends_with("Documents/MTLibrary.sqlite"));
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let config = Config {
        concurrency: 0,
        ..Config::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withEmptyPrefix_shouldFail() {
    let config = Config {
        identifier_prefix: String::new(),
        ..Config::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.concurrency, Config::default().concurrency);

    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "include_timestamps": true, "log_level": "debug", "fetch": { "country": "gb" } }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert!(config.include_timestamps);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.fetch.country, "gb");
    assert_eq!(config.fetch.language, "en-US");
    assert_eq!(config.fetch.timeout_secs, 30);
    assert!(config.skip_existing);

    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());

    Ok(())
}

#[test]
fn test_save_then_load_shouldPreserveOverrides() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");
    let config = Config {
        concurrency: 9,
        include_timestamps: true,
        ..Config::default()
    };

    config.save(&path)?;
    let loaded = Config::load_or_create(&path)?;

    assert_eq!(loaded.concurrency, 9);
    assert!(loaded.include_timestamps);

    Ok(())
}

#[test]
fn test_fetch_config_has_signature_shouldRequireBothHeaders() {
    let mut config = Config::default();
    assert!(!config.fetch.has_signature());

    config.fetch.request_timestamp = "1700000000".to_string();
    assert!(!config.fetch.has_signature());

    config.fetch.action_signature = "signature".to_string();
    assert!(config.fetch.has_signature());
}

#[test]
fn test_log_level_to_level_filter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
