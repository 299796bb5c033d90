//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod storage;
mod transport;

pub use storage::SessionStorage;
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
