//! Persistent hotfix manifest cache.
//!
//! One JSON file holds the cached manifest per full version string, the
//! hex AES key per numeric version and the local-cache flag. The file is
//! loaded once at startup; a missing file starts empty, and any supported
//! version without an entry gets an empty record synthesized so the file
//! always documents the configured surface. A malformed file is a startup
//! error rather than silently starting with an empty cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::version::extract_version_number;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HotfixFile {
    /// Cached manifest per full version string. An empty object means
    /// "known version, not yet fetched".
    #[serde(default)]
    hotfixes: BTreeMap<String, Value>,
    /// Hex-encoded 256-bit AES key per numeric version.
    #[serde(default)]
    aes_keys: BTreeMap<u32, String>,
    /// When set, resource URL tables point at this server instead of
    /// the official CDNs.
    #[serde(default)]
    use_local_cache: bool,
}

/// Thread-safe wrapper around the hotfix file.
pub struct HotfixStore {
    path: PathBuf,
    state: Mutex<HotfixFile>,
}

impl HotfixStore {
    /// Loads the hotfix file, synthesizing empty records for every
    /// supported version that lacks one, and writes the result back so
    /// operators can see exactly which versions the server knows about.
    pub fn load(path: &Path, supported_versions: &[String]) -> Result<Self, GatewayError> {
        let mut file = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| GatewayError::Persist(format!("read {}: {e}", path.display())))?;
            serde_json::from_str::<HotfixFile>(&raw)
                .map_err(|e| GatewayError::Persist(format!("parse {}: {e}", path.display())))?
        } else {
            info!("📄 Hotfix file {} missing, starting empty", path.display());
            HotfixFile::default()
        };

        for version in supported_versions {
            file.hotfixes
                .entry(version.clone())
                .or_insert_with(|| Value::Object(Default::default()));
            if let Some(number) = extract_version_number(version) {
                file.aes_keys.entry(number).or_default();
            }
        }

        let store = Self {
            path: path.to_path_buf(),
            state: Mutex::new(file),
        };
        store.persist()?;
        info!(
            "📄 Loaded hotfix data for {} version(s) from {}",
            store.version_count(),
            path.display()
        );
        Ok(store)
    }

    /// Returns the cached manifest for a full version string, if one
    /// has been fetched. Empty placeholder records count as a miss.
    pub fn manifest(&self, version_key: &str) -> Option<Value> {
        let state = self.state.lock().ok()?;
        match state.hotfixes.get(version_key) {
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(value) => Some(value.clone()),
            None => None,
        }
    }

    /// Returns the hex AES key configured for a numeric version, if any.
    /// An empty placeholder string counts as no key.
    pub fn aes_key_hex(&self, version: u32) -> Option<String> {
        let state = self.state.lock().ok()?;
        state
            .aes_keys
            .get(&version)
            .filter(|key| !key.is_empty())
            .cloned()
    }

    /// All configured (version, hex key) pairs, for cipher construction.
    pub fn aes_keys(&self) -> Vec<(u32, String)> {
        match self.state.lock() {
            Ok(state) => state
                .aes_keys
                .iter()
                .filter(|(_, key)| !key.is_empty())
                .map(|(version, key)| (*version, key.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn use_local_cache(&self) -> bool {
        self.state.lock().map(|s| s.use_local_cache).unwrap_or(false)
    }

    /// Stores a freshly fetched manifest and persists the file. A disk
    /// failure keeps the in-memory cache intact and is only logged;
    /// serving clients does not depend on the write.
    pub fn save_manifest(&self, version_key: &str, manifest: Value) {
        if let Ok(mut state) = self.state.lock() {
            state.hotfixes.insert(version_key.to_string(), manifest);
        }
        if let Err(e) = self.persist() {
            warn!("Failed to persist hotfix data: {e}");
        }
    }

    fn version_count(&self) -> usize {
        self.state.lock().map(|s| s.hotfixes.len()).unwrap_or(0)
    }

    fn persist(&self) -> Result<(), GatewayError> {
        let serialized = {
            let state = self
                .state
                .lock()
                .map_err(|_| GatewayError::Internal("hotfix lock poisoned".into()))?;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| GatewayError::Persist(format!("serialize hotfix data: {e}")))?
        };
        std::fs::write(&self.path, serialized)
            .map_err(|e| GatewayError::Persist(format!("write {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bootstrap_fills_supported_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotfix.json");
        let versions = vec!["1_os_3.9".to_string(), "1_global_8.1".to_string()];
        let store = HotfixStore::load(&path, &versions).unwrap();

        // Placeholders are misses, but the file on disk lists them.
        assert!(store.manifest("1_os_3.9").is_none());
        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert!(doc["hotfixes"].get("1_os_3.9").is_some());
        assert!(doc["hotfixes"].get("1_global_8.1").is_some());
        assert!(doc["aes_keys"].get("39").is_some());
        assert!(doc["aes_keys"].get("81").is_some());
    }

    #[test]
    fn saved_manifest_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotfix.json");
        let versions = vec!["1_os_3.9".to_string()];

        let store = HotfixStore::load(&path, &versions).unwrap();
        store.save_manifest("1_os_3.9", json!({"asset_bundle": {"version": 42}}));
        assert_eq!(
            store.manifest("1_os_3.9").unwrap()["asset_bundle"]["version"],
            42
        );

        let reloaded = HotfixStore::load(&path, &versions).unwrap();
        assert_eq!(
            reloaded.manifest("1_os_3.9").unwrap()["asset_bundle"]["version"],
            42
        );
    }

    #[test]
    fn malformed_file_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotfix.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(HotfixStore::load(&path, &[]).is_err());
    }

    #[test]
    fn empty_key_placeholder_is_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotfix.json");
        let store = HotfixStore::load(&path, &["1_os_3.9".to_string()]).unwrap();
        assert!(store.aes_key_hex(39).is_none());
        assert!(store.aes_keys().is_empty());
    }
}
