//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the Transport port
//! - JSON file (with fs2 locking) and in-memory maps for SessionStorage
//! - A mock backend server for tests

pub mod file_store;
pub mod http;
pub mod memory_store;

#[cfg(test)]
pub mod mock_backend;
