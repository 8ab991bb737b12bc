//! Preference store adapters.
//!
//! Values are plain strings keyed by name, like browser local storage.

use foodify_ports::{BoxFuture, PreferenceStorePort};
use foodify_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Preference store persisted as a single JSON object file.
///
/// A missing file reads as empty. Writes replace the file atomically
/// (temp file + rename) and are serialized through an async lock.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFilePreferenceStore {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => return Err(self.io_error("read", &error)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(self.invalid_store("preference file must hold a JSON object")),
            Err(error) => Err(self.invalid_store(format!("invalid preference file: {error}"))),
        }
    }

    async fn write_all(&self, map: Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| self.io_error("create_dir", &error))?;
        }
        let mut encoded = serde_json::to_vec_pretty(&Value::Object(map)).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                format!("failed to encode preferences: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        encoded.push(b'\n');

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        tokio::fs::write(&temp_path, &encoded)
            .await
            .map_err(|error| self.io_error("write", &error))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|error| self.io_error("rename", &error))
    }

    fn io_error(&self, action: &'static str, error: &std::io::Error) -> ErrorEnvelope {
        ErrorEnvelope::unexpected(
            ErrorCode::new("prefs", "io"),
            format!("preference file {action} failed: {error}"),
            ErrorClass::NonRetriable,
        )
        .with_metadata("path", self.path.to_string_lossy().to_string())
    }

    fn invalid_store(&self, message: impl Into<String>) -> ErrorEnvelope {
        ErrorEnvelope::expected(ErrorCode::new("prefs", "invalid_store"), message)
            .with_metadata("path", self.path.to_string_lossy().to_string())
    }
}

impl PreferenceStorePort for JsonFilePreferenceStore {
    fn get(&self, ctx: &RequestContext, key: &str) -> BoxFuture<'_, Result<Option<String>>> {
        let ctx = ctx.clone();
        let key = key.to_owned();
        Box::pin(async move {
            ctx.ensure_not_cancelled("prefs.get")?;
            let map = self.read_all().await?;
            Ok(map.get(&key).map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }))
        })
    }

    fn set(&self, ctx: &RequestContext, key: &str, value: String) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        let key = key.to_owned();
        Box::pin(async move {
            ctx.ensure_not_cancelled("prefs.set")?;
            let _guard = self.write_lock.lock().await;
            let mut map = self.read_all().await?;
            map.insert(key, Value::String(value));
            self.write_all(map).await
        })
    }
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Snapshot of every stored value.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl PreferenceStorePort for MemoryPreferenceStore {
    fn get(&self, ctx: &RequestContext, key: &str) -> BoxFuture<'_, Result<Option<String>>> {
        let result = ctx.ensure_not_cancelled("prefs.get").and_then(|()| {
            self.values
                .lock()
                .map(|guard| guard.get(key).cloned())
                .map_err(|_| poisoned())
        });
        Box::pin(async move { result })
    }

    fn set(&self, ctx: &RequestContext, key: &str, value: String) -> BoxFuture<'_, Result<()>> {
        let result = ctx.ensure_not_cancelled("prefs.set").and_then(|()| {
            self.values
                .lock()
                .map(|mut guard| {
                    guard.insert(key.to_owned(), value);
                })
                .map_err(|_| poisoned())
        });
        Box::pin(async move { result })
    }
}

fn poisoned() -> ErrorEnvelope {
    ErrorEnvelope::invariant(ErrorCode::internal(), "preference store lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFilePreferenceStore {
        let dir = std::env::temp_dir().join(format!(
            "foodify-prefs-{}-{name}",
            std::process::id()
        ));
        JsonFilePreferenceStore::new(dir.join("prefs.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() -> Result<()> {
        let store = temp_store("missing");
        let ctx = RequestContext::new_request();
        assert_eq!(store.get(&ctx, "foodify-theme").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn values_survive_a_new_store_instance() -> Result<()> {
        let store = temp_store("roundtrip");
        let ctx = RequestContext::new_request();
        store.set(&ctx, "foodify-theme", "dark".to_owned()).await?;
        store
            .set(&ctx, "foodify-cart", "[]".to_owned())
            .await?;

        let reopened = JsonFilePreferenceStore::new(store.path());
        assert_eq!(
            reopened.get(&ctx, "foodify-theme").await?.as_deref(),
            Some("dark")
        );
        assert_eq!(reopened.get(&ctx, "foodify-cart").await?.as_deref(), Some("[]"));

        tokio::fs::remove_file(store.path()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() -> Result<()> {
        let store = temp_store("corrupt");
        if let Some(parent) = store.path().parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(store.path(), b"[1, 2]").await?;

        let ctx = RequestContext::new_request();
        let error = store.get(&ctx, "foodify-theme").await.err();
        assert!(matches!(
            error,
            Some(ref e) if e.code == ErrorCode::new("prefs", "invalid_store")
        ));

        tokio::fs::remove_file(store.path()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_honors_cancellation() -> Result<()> {
        let store = MemoryPreferenceStore::default();
        let ctx = RequestContext::new_request();
        store.set(&ctx, "foodify-theme", "light".to_owned()).await?;
        assert_eq!(store.values().get("foodify-theme").map(String::as_str), Some("light"));

        ctx.cancel();
        let error = store.get(&ctx, "foodify-theme").await.err();
        assert!(matches!(error, Some(ref e) if e.is_cancelled()));
        Ok(())
    }
}
