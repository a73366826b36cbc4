//! Persistent key-value stores backing the session

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// Key/value storage with local-storage semantics: string keys, string values,
/// reads of unknown keys yield `None`.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
}

/// Store persisted as a flat JSON object on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> ClientResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Session(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn parse_entries(&self, raw: &str) -> ClientResult<Map<String, Value>> {
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(ClientError::Session(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(ClientError::Session(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn read_entries(&self) -> ClientResult<Map<String, Value>> {
        match self.read_raw()? {
            Some(raw) => self.parse_entries(&raw),
            None => Ok(Map::new()),
        }
    }

    /// Entries to update in place, and whether an unparseable store was discarded
    /// to get them. Discarding keeps login and logout working after a corrupt write.
    fn entries_for_update(&self) -> ClientResult<(Map<String, Value>, bool)> {
        let Some(raw) = self.read_raw()? else {
            return Ok((Map::new(), false));
        };

        match self.parse_entries(&raw) {
            Ok(entries) => Ok((entries, false)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session store: {}", e);
                Ok((Map::new(), true))
            }
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Session(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Session(format!("Failed to encode session: {}", e)))?;

        // Readers see either the old file or the new one, never a partial write
        let tmp = self.tmp_path();
        fs::write(&tmp, body).map_err(|e| {
            ClientError::Session(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ClientError::Session(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let (mut entries, _) = self.entries_for_update()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let (mut entries, discarded) = self.entries_for_update()?;
        if entries.remove(key).is_some() || discarded {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Process-local store, used by tests and short-lived tooling
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Session("Memory store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
