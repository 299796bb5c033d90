//! File-backed session storage
//!
//! Keeps the session region as a JSON object in one file. Writes hold an
//! exclusive lock on a sibling `.lock` file and replace the data file via
//! rename, so concurrent `rw` invocations never see a half-written file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStorage;

type Region = BTreeMap<String, String>;

/// Session storage persisted to `<app_dir>/session.json`
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| Error::storage(format!("Failed to open session lock: {}", e)))
    }

    /// Read the region; a missing or unreadable file is an empty region
    fn read_region(&self) -> Region {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_region(&self, region: &Region) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(region)?)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn with_shared<T>(&self, f: impl FnOnce(&Region) -> T) -> Result<T> {
        let lock = self.open_lock()?;
        lock.lock_shared()
            .map_err(|e| Error::storage(format!("Failed to lock session: {}", e)))?;
        let result = f(&self.read_region());
        let _ = lock.unlock();
        Ok(result)
    }

    fn with_exclusive(&self, f: impl FnOnce(&mut Region)) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .map_err(|e| Error::storage(format!("Failed to lock session: {}", e)))?;
        let mut region = self.read_region();
        f(&mut region);
        let result = self.write_region(&region);
        let _ = lock.unlock();
        result
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_shared(|region| region.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_exclusive(|region| {
            region.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_exclusive(|region| {
            region.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_exclusive(|region| region.clear())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_shared(|region| region.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));

        assert_eq!(storage.get("access_token").unwrap(), None);
        storage.set("access_token", "\"t\"").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), Some("\"t\"".into()));

        storage.remove("access_token").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), None);
        storage.remove("access_token").unwrap();
    }

    #[test]
    fn test_values_survive_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileSessionStorage::new(&path).set("k", "v").unwrap();

        let reopened = FileSessionStorage::new(&path);
        assert_eq!(reopened.get("k").unwrap(), Some("v".into()));
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();

        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert_eq!(storage.get("a").unwrap(), None);
        storage.set("a", "1").unwrap();
        assert_eq!(storage.get("a").unwrap(), Some("1".into()));
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested/app/session.json"));
        storage.set("a", "1").unwrap();
        assert!(storage.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));
        storage.set("access_token", "\"secret\"").unwrap();
        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
