//! # foodify-adapters
//!
//! Adapter implementations for ports (catalog HTTP client, connectivity,
//! structured logging, preference storage).
//! This crate depends on `ports`, `shared`, `domain` and `config`.

/// Remote catalog adapters.
pub mod catalog;

pub mod connectivity;
pub mod log_sink;
pub mod logger;
pub mod prefs;

#[cfg(feature = "open-food-facts")]
pub use catalog::open_food_facts::OpenFoodFactsCatalog;
pub use connectivity::{AlwaysOnline, ConnectivitySwitch};
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use prefs::{JsonFilePreferenceStore, MemoryPreferenceStore};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_ports::ports_crate_version;
    use foodify_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("foodify-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app() {
        let deps = workspace_deps();
        assert!(!deps.is_empty());
        assert!(
            !deps.iter().any(|dep| dep == "foodify-app"),
            "forbidden dependency found: foodify-app"
        );
    }

    #[test]
    fn adapters_can_use_ports_and_shared() {
        assert_eq!(adapters_crate_version(), ports_crate_version());
        assert_eq!(adapters_crate_version(), shared_crate_version());
    }
}
