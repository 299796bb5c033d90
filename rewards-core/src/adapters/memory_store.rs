//! In-process session storage

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStorage;

/// Session storage that lives as long as the value does
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    region: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn region(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.region
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.region()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.region()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.region()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.region()?.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.region()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_clear() {
        let storage = MemorySessionStorage::new();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        assert_eq!(storage.get("a").unwrap(), Some("1".into()));
        assert_eq!(storage.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        storage.clear().unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
    }
}
