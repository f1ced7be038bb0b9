/*!
 * Tests for configuration loading and validation
 */

use std::fs;

use subchunk::app_config::{Config, LogLevel, TranslationProvider};

use crate::common;

#[test]
fn test_loadOrCreate_missingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let (config, created) = Config::load_or_create(&path).unwrap();

    assert!(created);
    assert!(path.exists());
    assert_eq!(config.target_language, "es");
    assert_eq!(config.chunking.chunk_size, 25);
    assert_eq!(config.chunking.overlap, 3);

    let (reloaded, created_again) = Config::load_or_create(&path).unwrap();
    assert!(!created_again);
    assert_eq!(reloaded.chunking, config.chunking);
}

#[test]
fn test_loadOrCreate_partialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"target_language": "fr", "chunking": {"chunk_size": 40}, "log_level": "debug"}"#,
    )
    .unwrap();

    let (config, created) = Config::load_or_create(&path).unwrap();

    assert!(!created);
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.chunking.chunk_size, 40);
    assert_eq!(config.chunking.overlap, 3);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
}

#[test]
fn test_loadOrCreate_invalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_validate_completeConfig_shouldPass() {
    assert!(common::test_config("ja").validate().is_ok());
}

#[test]
fn test_validate_badValues_shouldFail() {
    let mut config = common::test_config("zz");
    assert!(config.validate().is_err());

    config = common::test_config("es");
    config.chunking.overlap = config.chunking.chunk_size;
    assert!(config.validate().is_err());

    config = common::test_config("es");
    config.translation.common.temperature = 1.5;
    assert!(config.validate().is_err());

    config = common::test_config("es");
    config.translation.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_activeProviderConfigMut_shouldOverrideModel() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().model = "claude-haiku-4-5".to_string();

    assert_eq!(config.translation.get_model(), "claude-haiku-4-5");
    assert_eq!(config.translation.available_providers.len(), 1);
}

#[test]
fn test_logLevel_shouldMapToFilter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
