//! Where save data lives: a file on native targets, `localStorage` in the
//! browser, or memory for tests.

#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::io::ErrorKind;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::SaveError;

/// A single save slot holding one encoded snapshot.
pub trait SaveStore: Send + Sync + 'static {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>, SaveError>;
    fn write(&self, data: &str) -> Result<(), SaveError>;
    /// Human-readable location for log messages.
    fn describe(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════
// FILE
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveStore for FileStore {
    fn read(&self) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, data: &str) -> Result<(), SaveError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        // Write to a temp file first, then rename for atomicity
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BROWSER
// ═══════════════════════════════════════════════════════════════════════

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    // Looked up per call: `web_sys::Storage` is not Send.
    fn storage() -> Result<web_sys::Storage, SaveError> {
        web_sys::window()
            .ok_or_else(|| SaveError::Storage("no window".into()))?
            .local_storage()
            .map_err(|_| SaveError::Storage("localStorage access denied".into()))?
            .ok_or_else(|| SaveError::Storage("localStorage unavailable".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorageStore {
    fn read(&self) -> Result<Option<String>, SaveError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|_| SaveError::Storage(format!("could not read '{}'", self.key)))
    }

    fn write(&self, data: &str) -> Result<(), SaveError> {
        Self::storage()?
            .set_item(&self.key, data)
            .map_err(|_| SaveError::Storage(format!("could not write '{}' (quota?)", self.key)))
    }

    fn describe(&self) -> String {
        format!("localStorage['{}']", self.key)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MEMORY
// ═══════════════════════════════════════════════════════════════════════

/// Clones share the same slot, so a test can keep a handle and inspect
/// what the app wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Option<String>>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Arc::new(Mutex::new(Some(data.into()))),
            fail_writes: false,
        }
    }

    /// Every write fails; reads still work.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.data.lock().ok().and_then(|data| data.clone())
    }
}

impl SaveStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, SaveError> {
        let data = self
            .data
            .lock()
            .map_err(|_| SaveError::Storage("memory store poisoned".into()))?;
        Ok(data.clone())
    }

    fn write(&self, text: &str) -> Result<(), SaveError> {
        if self.fail_writes {
            return Err(SaveError::Storage("memory store is read-only".into()));
        }
        let mut data = self
            .data
            .lock()
            .map_err(|_| SaveError::Storage("memory store poisoned".into()))?;
        *data = Some(text.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_shares_between_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();
        assert_eq!(store.read().unwrap(), None);

        store.write("{}").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("{}"));
    }

    #[test]
    fn test_failing_memory_store_keeps_old_data() {
        let store = MemoryStore::failing();
        assert!(matches!(store.write("x"), Err(SaveError::Storage(_))));
        assert_eq!(store.read().unwrap(), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("hayfield_store_{}", std::process::id()));
        let store = FileStore::new(dir.join("nested").join("farm.json"));

        assert_eq!(store.read().unwrap(), None);
        store.write("first").unwrap();
        store.write("second").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("second"));
        assert!(!dir.join("nested").join("farm.json.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
