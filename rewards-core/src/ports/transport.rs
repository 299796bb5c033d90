//! Backend transport port
//!
//! Defines the interface for sending one request to the rewards backend.
//! The ApiClient builds requests and interprets responses; a Transport only
//! moves bytes (HTTP in production, scripted responses in tests).

use std::fmt;

use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// HTTP method used by the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/auth/login`
    pub endpoint: String,
    pub body: Option<JsonValue>,
    /// Sent as `Authorization: Bearer <token>` when present
    pub bearer: Option<String>,
}

/// Raw response from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Backend transport trait
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status, and `Error::Network` when no response arrived at all.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}
