//! Transient notifications
//!
//! Toasts expire a fixed time after they were pushed. Any number can be
//! active at once and each one is dismissed on its own.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: Instant,
}

/// Queue of active toasts
#[derive(Debug)]
pub struct Notifier {
    duration: Duration,
    next_id: u64,
    toasts: Vec<Toast>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            next_id: 1,
            toasts: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Add a toast created now; returns its id
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message, Instant::now())
    }

    pub fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, at: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            created_at: at,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, message)
    }

    /// Drop toasts that expired by `now` and return the rest, oldest first
    pub fn active_at(&mut self, now: Instant) -> &[Toast] {
        let duration = self.duration;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created_at) < duration);
        &self.toasts
    }

    pub fn active(&mut self) -> &[Toast] {
        self.active_at(Instant::now())
    }

    /// Remove one toast; false if it was already gone
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Take every pending toast regardless of age
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }
}
