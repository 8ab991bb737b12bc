//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or malformed
//! fails fast instead of being ignored.

use crate::schema::{CatalogConfig, ValidatedCatalogConfig};
use foodify_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Env var: upstream base URL.
pub const ENV_BASE_URL: &str = "FOODIFY_BASE_URL";
/// Env var: `User-Agent` header value.
pub const ENV_USER_AGENT: &str = "FOODIFY_USER_AGENT";
/// Env var: per-attempt request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "FOODIFY_TIMEOUT_MS";
/// Env var: retry max attempts.
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "FOODIFY_RETRY_MAX_ATTEMPTS";
/// Env var: feed page size.
pub const ENV_PAGE_SIZE: &str = "FOODIFY_PAGE_SIZE";
/// Env var: search debounce in milliseconds.
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "FOODIFY_SEARCH_DEBOUNCE_MS";

const ALL_VARS: [&str; 6] = [
    ENV_BASE_URL,
    ENV_USER_AGENT,
    ENV_TIMEOUT_MS,
    ENV_RETRY_MAX_ATTEMPTS,
    ENV_PAGE_SIZE,
    ENV_SEARCH_DEBOUNCE_MS,
];

/// Parsed env overrides. `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEnv {
    /// Override for `client.baseUrl`.
    pub base_url: Option<Box<str>>,
    /// Override for `client.userAgent`.
    pub user_agent: Option<Box<str>>,
    /// Override for `client.timeoutMs`.
    pub timeout_ms: Option<u64>,
    /// Override for `client.retry.maxAttempts`.
    pub retry_max_attempts: Option<u32>,
    /// Override for `feed.pageSize`.
    pub page_size: Option<u32>,
    /// Override for `feed.searchDebounceMs`.
    pub search_debounce_ms: Option<u64>,
}

impl CatalogEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            base_url: parse_optional_url(map, ENV_BASE_URL)?,
            user_agent: parse_optional_trimmed_string(map, ENV_USER_AGENT)?,
            timeout_ms: parse_optional_int(map, ENV_TIMEOUT_MS)?,
            retry_max_attempts: parse_optional_int(map, ENV_RETRY_MAX_ATTEMPTS)?,
            page_size: parse_optional_int(map, ENV_PAGE_SIZE)?,
            search_debounce_ms: parse_optional_int(map, ENV_SEARCH_DEBOUNCE_MS)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ALL_VARS
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.user_agent.is_none()
            && self.timeout_ms.is_none()
            && self.retry_max_attempts.is_none()
            && self.page_size.is_none()
            && self.search_debounce_ms.is_none()
    }
}

/// Apply env overrides on top of a base config, then validate the result.
pub fn apply_env_overrides(
    base: CatalogConfig,
    env: &CatalogEnv,
) -> Result<ValidatedCatalogConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(base_url) = &env.base_url {
        config.client.base_url = base_url.clone();
    }
    if let Some(user_agent) = &env.user_agent {
        config.client.user_agent = user_agent.clone();
    }
    set_if_some(&mut config.client.timeout_ms, env.timeout_ms);
    set_if_some(&mut config.client.retry.max_attempts, env.retry_max_attempts);
    set_if_some(&mut config.feed.page_size, env.page_size);
    set_if_some(&mut config.feed.search_debounce_ms, env.search_debounce_ms);

    config.validate_and_normalize().map_err(Into::into)
}

fn set_if_some<T: Copy>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidInt { var, .. } => {
                write!(formatter, "{var} must be a non-negative integer")
            },
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid URL"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidInt { var, value } | EnvParseError::InvalidUrl { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", value)
            },
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_int<T: FromStr>(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.into_string(),
        })
}

fn parse_optional_url(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    if Url::parse(&raw).is_err() {
        return Err(EnvParseError::InvalidUrl {
            var,
            value: raw.into_string(),
        });
    }
    Ok(Some(raw))
}
