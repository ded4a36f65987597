use convostore::cli::Args;
use convostore::config::{Config, FileConfig, StoreConfig};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn test_defaults_without_sources() {
    let config = Config::from_sources(&Args::default(), &FileConfig::default(), env_from(&[]))
        .unwrap();
    assert_eq!(config.store, StoreConfig::default());
    assert_eq!(config.store.ceiling_bytes, 3500);
    assert_eq!(config.store.compressed_key, "conversation_compressed");
    assert_eq!(config.store.legacy_key, "conversation");
    assert!(config.session_dir.is_none());
    assert!(!config.verbose);
}

#[test]
fn test_yaml_file_with_partial_store_section() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".convostore.yaml");
    fs::write(
        &path,
        "store:\n  ceiling_bytes: 2000\nsession:\n  dir: /tmp/convo\n  verbose: true\n",
    )
    .unwrap();

    let file_config = FileConfig::load_from(&path).unwrap();
    let config = Config::from_sources(&Args::default(), &file_config, env_from(&[])).unwrap();
    assert_eq!(config.store.ceiling_bytes, 2000);
    assert_eq!(config.store.max_content_chars, 8000);
    assert_eq!(config.session_dir, Some(PathBuf::from("/tmp/convo")));
    assert!(config.verbose);
}

#[test]
fn test_json_file_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".convostore.json");
    fs::write(&path, r#"{"store": {"max_content_chars": 4000}}"#).unwrap();

    let file_config = FileConfig::load_from(&path).unwrap();
    assert_eq!(file_config.store.unwrap().max_content_chars, 4000);
}

#[test]
fn test_precedence_cli_over_env_over_file() {
    let file_config = FileConfig {
        store: Some(StoreConfig::default().with_ceiling(2000)),
        ..FileConfig::default()
    };

    let env = env_from(&[("CONVO_CEILING_BYTES", "3000"), ("CONVO_MAX_CONTENT_CHARS", "6000")]);
    let config = Config::from_sources(&Args::default(), &file_config, env).unwrap();
    assert_eq!(config.store.ceiling_bytes, 3000);
    assert_eq!(config.store.max_content_chars, 6000);

    let args = Args {
        ceiling: Some(3900),
        ..Args::default()
    };
    let env = env_from(&[("CONVO_CEILING_BYTES", "3000")]);
    let config = Config::from_sources(&args, &file_config, env).unwrap();
    assert_eq!(config.store.ceiling_bytes, 3900);
}

#[test]
fn test_malformed_env_value_is_an_error() {
    let env = env_from(&[("CONVO_CEILING_BYTES", "lots")]);
    let result = Config::from_sources(&Args::default(), &FileConfig::default(), env);
    assert!(result.is_err());
}

#[test]
fn test_invalid_limits_rejected() {
    let env = env_from(&[("CONVO_CEILING_BYTES", "50"), ("CONVO_OVERHEAD_RESERVE", "50")]);
    assert!(Config::from_sources(&Args::default(), &FileConfig::default(), env).is_err());

    let same_keys = StoreConfig {
        legacy_key: "conversation_compressed".to_string(),
        ..StoreConfig::default()
    };
    assert!(same_keys.validate().is_err());
    assert!(StoreConfig::default().with_max_content_chars(10).validate().is_err());
}
