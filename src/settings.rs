//! Persisted key-value stores that supply argument defaults

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings file {0} must contain a JSON object")]
    NotAnObject(PathBuf),
}

/// Source of persisted values, keyed by canonical argument name
pub trait SettingsStore {
    fn value(&self, key: &str) -> Option<Value>;

    fn set_value(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str);

    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Persist pending changes. In-memory stores have nothing to do.
    fn sync(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for MemorySettings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn value(&self, key: &str) -> Option<Value> {
        self.values.get(key).filter(|v| !v.is_null()).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Store backed by a JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonSettings {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonSettings {
    /// Load `path`. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "settings file absent, starting empty");
                return Ok(Self { path, values: Map::new() });
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        if text.trim().is_empty() {
            return Ok(Self { path, values: Map::new() });
        }

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|source| SettingsError::Format { path: path.clone(), source })?;

        match parsed {
            Value::Object(values) => Ok(Self { path, values }),
            _ => Err(SettingsError::NotAnObject(path)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the store back to its file, replacing it atomically
    pub fn save(&self) -> Result<(), SettingsError> {
        let io_err = |source: std::io::Error| SettingsError::Io { path: self.path.clone(), source };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let text = serde_json::to_string_pretty(&self.values)
            .map_err(|source| SettingsError::Format { path: self.path.clone(), source })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(text.as_bytes()).map_err(io_err)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %self.path.display(), keys = self.values.len(), "settings saved");
        Ok(())
    }
}

impl SettingsStore for JsonSettings {
    fn value(&self, key: &str) -> Option<Value> {
        self.values.get(key).filter(|v| !v.is_null()).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        self.save()
    }

    fn keys(&self) -> Vec<String> {
        // serde_json's Map is ordered by key unless preserve_order is on
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_memory_store_ignores_null() {
        let store: MemorySettings = [("a", json!(1)), ("b", Value::Null)].into_iter().collect();
        assert_eq!(store.value("a"), Some(json!(1)));
        assert!(!store.contains("b"));
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettings::open(dir.path().join("absent.json")).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_save_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonSettings::open(&path).unwrap();
        store.set_value("threads", json!(4));
        store.set_value("paths", json!(["/a", "/b"]));
        store.save().unwrap();

        let reopened = JsonSettings::open(&path).unwrap();
        assert_eq!(reopened.value("threads"), Some(json!(4)));
        assert_eq!(reopened.value("paths"), Some(json!(["/a", "/b"])));

        let mut reopened = reopened;
        reopened.remove("threads");
        assert!(!reopened.contains("threads"));
    }

    #[test]
    fn test_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert_matches!(JsonSettings::open(&path), Err(SettingsError::NotAnObject(_)));

        std::fs::write(&path, "{ broken").unwrap();
        assert_matches!(JsonSettings::open(&path), Err(SettingsError::Format { .. }));
    }
}
