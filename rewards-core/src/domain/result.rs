//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::router::Page;

/// Fallback shown when the backend gives no usable message
pub const GENERIC_NETWORK_ERROR: &str = "Network error. Please try again.";

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// No access token in the session store
    #[error("Not authenticated. Please log in.")]
    NotAuthenticated,

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Request never produced a response
    #[error("{0}")]
    Network(String),

    /// A flow step was entered without the staging data it needs
    #[error("{message}")]
    MissingContext { message: String, redirect: Page },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a missing-context error that sends the user back to `redirect`
    pub fn missing_context(msg: impl Into<String>, redirect: Page) -> Self {
        Self::MissingContext {
            message: msg.into(),
            redirect,
        }
    }

    /// Page the front end should navigate to after reporting this error
    ///
    /// Authentication failures (no token, or a 401 from the backend) send
    /// the user to login; missing flow context sends them to the flow start.
    pub fn redirect_to(&self) -> Option<Page> {
        match self {
            Self::MissingContext { redirect, .. } => Some(*redirect),
            Self::NotAuthenticated => Some(Page::Login),
            e if e.is_unauthorized() => Some(Page::Login),
            _ => None,
        }
    }

    /// Whether the backend rejected the access token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Whether this error was raised locally without touching the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotAuthenticated | Self::MissingContext { .. }
        )
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Attach a context value
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let redirect = e.redirect_to();
                let failed = Self::fail(e.to_string());
                match redirect {
                    Some(page) => failed.with_context("redirect", serde_json::json!(page)),
                    None => failed,
                }
            }
        }
    }
}
