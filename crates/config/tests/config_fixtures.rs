#![allow(missing_docs)]

use foodify_config::{
    CatalogEnv, load_catalog_config_from_path, parse_catalog_config_json,
    parse_catalog_config_toml,
};
use foodify_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn temp_config(name: &str, contents: &str) -> Result<PathBuf, ErrorEnvelope> {
    let dir = std::env::temp_dir().join(format!(
        "foodify-config-{}-{}",
        std::process::id(),
        name.replace('.', "-")
    ));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn partial_json_fills_defaults() -> Result<(), ErrorEnvelope> {
    let validated = parse_catalog_config_json(r#"{ "feed": { "pageSize": 10 } }"#)?;
    let config = validated.as_config();

    assert_eq!(config.feed.page_size, 10);
    assert_eq!(config.feed.search_debounce_ms, 600);
    assert_eq!(config.client.retry.max_attempts, 3);
    assert_eq!(config.categories.max_count, 50);
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() {
    let error = parse_catalog_config_json(r#"{ "feed": { "pagesize": 10 } }"#).err();
    assert!(matches!(error, Some(ref e) if e.code.code() == "invalid_json"));
}

#[test]
fn toml_configs_are_supported() -> Result<(), ErrorEnvelope> {
    let validated = parse_catalog_config_toml(
        r#"
version = 1

[client]
baseUrl = "http://localhost:8080/"
timeoutMs = 5000

[client.retry]
maxAttempts = 1
"#,
    )?;
    let config = validated.as_config();
    assert_eq!(config.client.base_url.as_ref(), "http://localhost:8080");
    assert_eq!(config.client.timeout_ms, 5_000);
    assert_eq!(validated.retry_policy().max_attempts, 1);
    Ok(())
}

#[test]
fn unsupported_versions_fail() {
    let error = parse_catalog_config_json(r#"{ "version": 2 }"#).err();
    assert!(matches!(
        error,
        Some(ref e) if e.code.code() == "unsupported_version"
            && e.metadata.get("found").map(String::as_str) == Some("2")
    ));
}

#[test]
fn env_wins_over_file() -> Result<(), ErrorEnvelope> {
    let path = temp_config(
        "precedence.json",
        r#"{ "feed": { "pageSize": 10, "searchDebounceMs": 300 } }"#,
    )?;
    let mut map = BTreeMap::new();
    map.insert("FOODIFY_PAGE_SIZE".to_string(), "40".to_string());
    let env = CatalogEnv::from_map(&map)?;

    let validated = load_catalog_config_from_path(Some(&path), &env)?;
    let config = validated.as_config();
    assert_eq!(config.feed.page_size, 40);
    assert_eq!(config.feed.search_debounce_ms, 300);

    std::fs::remove_file(&path)?;
    Ok(())
}
