//! Session storage port
//!
//! A flat string key/value region scoped to one client session. The
//! SessionStore layers typed accessors on top; implementations only store
//! strings.

use crate::domain::result::Result;

pub trait SessionStorage: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key in the region
    fn clear(&self) -> Result<()>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>>;
}
