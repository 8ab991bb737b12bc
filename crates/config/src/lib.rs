//! # foodify-config
//!
//! Configuration schema, validation, env overrides and loading for the
//! catalog client, the product feed and the CLI.
//! This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, CatalogConfig, CategoriesConfig, ClientConfig, ConfigSchemaError,
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FeedConfig, RetryConfig, ValidatedCatalogConfig,
    parse_catalog_config_json, parse_catalog_config_toml,
};

pub use env::{CatalogEnv, EnvParseError, apply_env_overrides};
pub use load::{
    load_catalog_config_from_path, load_catalog_config_std_env, to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_shared::shared_crate_version;

    #[test]
    fn config_can_use_shared() {
        assert_eq!(config_crate_version(), shared_crate_version());
    }
}
