//! Credential and configuration store.
//!
//! # Responsibilities
//! - Hand out a fresh `SpaceConfig` snapshot on every `read`
//! - Merge partial updates into the project's local file
//! - Remove single keys (logout)
//!
//! # Design Decisions
//! - Nothing is cached; a login or logout is visible to the next request
//! - Writes only ever touch the local file, never the home layer
//! - Each call is a complete read-modify-write of one file

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::loader::{self, ConfigError, CONFIG_FILE_NAME};
use crate::config::schema::{ConfigKey, ConfigPatch, SpaceConfig};

/// Storage backing the proxy configuration.
pub trait ConfigStore: Send + Sync {
    /// Load a fresh snapshot with defaults applied.
    fn read(&self) -> Result<SpaceConfig, ConfigError>;

    /// Merge `patch` into the stored configuration.
    fn write(&self, patch: &ConfigPatch) -> Result<(), ConfigError>;

    /// Remove one key from the stored configuration.
    fn delete(&self, key: ConfigKey) -> Result<(), ConfigError>;
}

fn merge_patch(table: &mut toml::Table, patch: &ConfigPatch) -> Result<(), ConfigError> {
    if let toml::Value::Table(updates) = toml::Value::try_from(patch)? {
        table.extend(updates);
    }
    Ok(())
}

/// `.tsapp` files on disk: the home file first, the project file on top.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    layers: Vec<PathBuf>,
    local: PathBuf,
}

impl FileConfigStore {
    /// Store for the project in `project_dir`, layered over the user's home file.
    pub fn discover(project_dir: impl AsRef<Path>) -> Self {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILE_NAME));
        Self::with_home(home, project_dir)
    }

    /// Store with an explicit (or no) home layer.
    pub fn with_home(home_file: Option<PathBuf>, project_dir: impl AsRef<Path>) -> Self {
        let local = project_dir.as_ref().join(CONFIG_FILE_NAME);
        let mut layers: Vec<PathBuf> = home_file.into_iter().filter(|h| *h != local).collect();
        layers.push(local.clone());
        Self { layers, local }
    }

    /// Path of the project-local file that receives writes.
    pub fn local_path(&self) -> &Path {
        &self.local
    }

    fn local_table(&self) -> Result<toml::Table, ConfigError> {
        Ok(loader::read_table(&self.local)?.unwrap_or_default())
    }

    /// Whether a layer below the local file sets `key` to a non-blank value.
    fn inherited(&self, key: ConfigKey) -> Result<bool, ConfigError> {
        for path in self.layers.iter().filter(|p| **p != self.local) {
            let Some(table) = loader::read_table(path)? else {
                continue;
            };
            let set = table
                .get(key.as_str())
                .and_then(toml::Value::as_str)
                .is_some_and(|v| !v.trim().is_empty());
            if set {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl ConfigStore for FileConfigStore {
    fn read(&self) -> Result<SpaceConfig, ConfigError> {
        loader::load_layered(&self.layers)
    }

    fn write(&self, patch: &ConfigPatch) -> Result<(), ConfigError> {
        let mut table = self.local_table()?;
        merge_patch(&mut table, patch)?;
        loader::write_table(&self.local, &table)?;
        tracing::debug!(path = %self.local.display(), "Configuration updated");
        Ok(())
    }

    fn delete(&self, key: ConfigKey) -> Result<(), ConfigError> {
        let mut table = self.local_table()?;
        let mut changed = table.remove(key.as_str()).is_some();
        if key.is_optional() && self.inherited(key)? {
            // A blank local value reads as unset and masks the home layer.
            table.insert(key.as_str().to_owned(), toml::Value::String(String::new()));
            changed = true;
        }
        if changed {
            loader::write_table(&self.local, &table)?;
            tracing::debug!(path = %self.local.display(), key = key.as_str(), "Configuration key removed");
        }
        Ok(())
    }
}

/// In-process store, for embedding the proxy without touching disk.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    table: Mutex<toml::Table>,
}

impl MemoryConfigStore {
    pub fn new(initial: &ConfigPatch) -> Result<Self, ConfigError> {
        let store = Self::default();
        store.write(initial)?;
        Ok(store)
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut toml::Table) -> T) -> T {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut table)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self) -> Result<SpaceConfig, ConfigError> {
        loader::from_table(self.with_table(|t| t.clone()))
    }

    fn write(&self, patch: &ConfigPatch) -> Result<(), ConfigError> {
        self.with_table(|t| merge_patch(t, patch))
    }

    fn delete(&self, key: ConfigKey) -> Result<(), ConfigError> {
        self.with_table(|t| t.remove(key.as_str()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_merges_into_local_file() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let home_file = home.path().join(CONFIG_FILE_NAME);
        fs::write(&home_file, "target_server = \"http://home.example\"\n").unwrap();
        fs::write(project.path().join(CONFIG_FILE_NAME), "port = 9001\n").unwrap();

        let store = FileConfigStore::with_home(Some(home_file.clone()), project.path());
        store.write(&ConfigPatch::auth_token("secret-token")).unwrap();

        let config = store.read().unwrap();
        assert_eq!(config.auth_token.as_deref(), Some("secret-token"));
        assert_eq!(config.port, 9001);
        assert_eq!(config.target_server, "http://home.example");

        // The home layer is never written.
        let home_content = fs::read_to_string(&home_file).unwrap();
        assert!(!home_content.contains("secret-token"));
    }

    #[test]
    fn test_delete_removes_key() {
        let project = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_home(None, project.path());
        store.write(&ConfigPatch::auth_token("t")).unwrap();
        store.delete(ConfigKey::AuthToken).unwrap();
        assert!(store.read().unwrap().auth_token.is_none());

        // Deleting an absent key is a no-op, including on a missing file.
        let empty = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_home(None, empty.path());
        store.delete(ConfigKey::AuthToken).unwrap();
        assert!(!store.local_path().exists());
    }

    #[test]
    fn test_delete_masks_home_token() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let home_file = home.path().join(CONFIG_FILE_NAME);
        fs::write(&home_file, "auth_token = \"hometok\"\nport = 9002\n").unwrap();

        let store = FileConfigStore::with_home(Some(home_file.clone()), project.path());
        assert_eq!(store.read().unwrap().auth_token.as_deref(), Some("hometok"));

        store.delete(ConfigKey::AuthToken).unwrap();
        let config = store.read().unwrap();
        assert!(config.auth_token.is_none());
        assert_eq!(config.port, 9002);
        assert!(fs::read_to_string(&home_file).unwrap().contains("hometok"));

        // A later login still wins over the mask.
        store.write(&ConfigPatch::auth_token("fresh")).unwrap();
        assert_eq!(store.read().unwrap().auth_token.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_delete_required_key_falls_back_to_home() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let home_file = home.path().join(CONFIG_FILE_NAME);
        fs::write(&home_file, "port = 9002\n").unwrap();
        fs::write(project.path().join(CONFIG_FILE_NAME), "port = 9003\n").unwrap();

        let store = FileConfigStore::with_home(Some(home_file), project.path());
        store.delete(ConfigKey::Port).unwrap();
        assert_eq!(store.read().unwrap().port, 9002);
    }

    #[test]
    fn test_reads_are_never_cached() {
        let project = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_home(None, project.path());
        assert!(store.read().unwrap().auth_token.is_none());

        fs::write(store.local_path(), "auth_token = \"from-elsewhere\"\n").unwrap();
        assert_eq!(store.read().unwrap().auth_token.as_deref(), Some("from-elsewhere"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryConfigStore::new(&ConfigPatch {
            target_server: Some("http://origin.test".into()),
            ..ConfigPatch::default()
        })
        .unwrap();
        store.write(&ConfigPatch::auth_token("abc")).unwrap();
        let config = store.read().unwrap();
        assert_eq!(config.target_server, "http://origin.test");
        assert_eq!(config.auth_token.as_deref(), Some("abc"));

        store.delete(ConfigKey::AuthToken).unwrap();
        assert!(store.read().unwrap().auth_token.is_none());
    }
}
