//! Rewards Core - client library for the rewards backend
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: session, staging and record types plus local validation
//! - **ports**: traits for the backend transport and session storage
//! - **services**: API client, auth flows, routing, dashboard, event log
//! - **adapters**: reqwest transport, file and in-memory session storage

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::file_store::FileSessionStorage;
use adapters::http::HttpTransport;
use config::Config;
use ports::{SessionStorage, Transport};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    DashboardStats, DeviceMetadata, OtpPurpose, PendingReset, PendingSignup, RedemptionKind,
    RedemptionRequest, ResetKind, SignupForm, User,
};
pub use services::{
    EntryPoint, LogEntry, LogEvent, LoggingService, Navigation, Notifier, Page, ToastKind, Widget,
};

/// Session file inside the app directory
pub const SESSION_FILE: &str = "session.json";

/// Main context for client operations
///
/// Holds the configuration and every service, all sharing one session
/// store and one transport.
pub struct RewardsContext {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub router: Router,
    pub signup: SignupFlow,
    pub login: LoginFlow,
    pub password_reset: ResetFlow,
    pub pin_reset: ResetFlow,
    pub dashboard: DashboardService,
}

impl RewardsContext {
    /// Context backed by `<app_dir>/session.json` and the configured API
    pub fn new(app_dir: &Path) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let storage = FileSessionStorage::new(app_dir.join(SESSION_FILE));
        let transport = HttpTransport::new(&config.api.base_url, config.timeout())?;
        Ok(Self::with_ports(config, Arc::new(storage), Arc::new(transport)))
    }

    /// Context over caller-supplied ports
    pub fn with_ports(
        config: Config,
        storage: Arc<dyn SessionStorage>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let session = SessionStore::new(storage);
        let api = ApiClient::new(transport, session.clone());

        Self {
            config,
            router: Router::new(session.clone()),
            signup: SignupFlow::new(api.clone()),
            login: LoginFlow::new(api.clone()),
            password_reset: ResetFlow::new(ResetKind::Password, api.clone()),
            pin_reset: ResetFlow::new(ResetKind::Pin, api.clone()),
            dashboard: DashboardService::new(api.clone()),
            session,
            api,
        }
    }

    pub fn reset(&self, kind: ResetKind) -> &ResetFlow {
        match kind {
            ResetKind::Password => &self.password_reset,
            ResetKind::Pin => &self.pin_reset,
        }
    }

    /// Device metadata for a signup, using the configured IP lookup
    pub fn device_metadata(&self) -> DeviceMetadata {
        device::collect(self.config.device.ip_lookup_url.as_deref())
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.config.toast_duration())
    }
}
