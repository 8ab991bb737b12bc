//! Adapter wiring for CLI commands.

use crate::error::CliError;
use crate::format::OutputMode;
use foodify_adapters::{
    AlwaysOnline, JsonFilePreferenceStore, JsonLogger, OpenFoodFactsCatalog, StderrLogSink,
};
use foodify_app::{FeedDeps, FeedSettings, PreferencesDeps, ProductDetailsDeps, ProductFeed};
use foodify_config::{ValidatedCatalogConfig, load_catalog_config_std_env};
use foodify_ports::{CatalogPort, LogLevel, LoggerPort, log_fields};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default preference file, relative to the working directory.
pub const DEFAULT_PREFS_PATH: &str = ".foodify/prefs.json";

/// Resolved configuration plus lazily built adapters.
pub struct CliContext {
    config: ValidatedCatalogConfig,
    prefs_path: PathBuf,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl CliContext {
    /// Load config (file + env) and pick the preference file.
    pub fn load(
        mode: OutputMode,
        config_path: Option<&Path>,
        prefs_path: Option<&Path>,
    ) -> Result<Self, CliError> {
        let config = load_catalog_config_std_env(config_path)?;
        let logger = (mode.verbose > 0).then(|| {
            let level = if mode.verbose > 1 {
                LogLevel::Debug
            } else {
                LogLevel::Info
            };
            let logger = JsonLogger::new(Arc::new(StderrLogSink))
                .with_min_level(level)
                .with_base_fields(log_fields([("component", json!("cli"))]));
            Arc::new(logger) as Arc<dyn LoggerPort>
        });
        Ok(Self {
            config,
            prefs_path: prefs_path.map_or_else(|| PathBuf::from(DEFAULT_PREFS_PATH), Path::to_path_buf),
            logger,
        })
    }

    pub const fn config(&self) -> &ValidatedCatalogConfig {
        &self.config
    }

    pub fn catalog(&self) -> Result<Arc<dyn CatalogPort>, CliError> {
        Ok(Arc::new(OpenFoodFactsCatalog::new(&self.config)?))
    }

    pub fn feed(&self) -> Result<ProductFeed, CliError> {
        let settings = FeedSettings {
            page_size: self.config.as_config().feed.page_size,
            search_debounce: self.config.search_debounce(),
            filter_debounce: self.config.filter_debounce(),
        };
        let deps = FeedDeps {
            catalog: self.catalog()?,
            connectivity: Arc::new(AlwaysOnline),
            logger: self.logger.clone(),
        };
        Ok(ProductFeed::new(deps, settings)?)
    }

    pub fn details(&self) -> Result<ProductDetailsDeps, CliError> {
        Ok(ProductDetailsDeps {
            catalog: self.catalog()?,
            logger: self.logger.clone(),
        })
    }

    pub fn preferences(&self) -> PreferencesDeps {
        PreferencesDeps {
            store: Arc::new(JsonFilePreferenceStore::new(self.prefs_path.clone())),
            logger: self.logger.clone(),
        }
    }
}
