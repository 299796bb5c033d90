//! Service layer - client logic orchestration
//!
//! Services coordinate domain validation, the session store and the
//! backend transport. Each flow service owns one multi-step journey.

pub mod api;
pub mod dashboard;
pub mod device;
pub mod logging;
mod login;
pub mod notify;
mod otp;
mod reset;
pub mod router;
pub mod session;
mod signup;

pub use api::ApiClient;
pub use dashboard::{ActionOutcome, DashboardService, DashboardSnapshot, Widget};
pub use logging::{EntryPoint, FlowSummary, LogEntry, LogEvent, LoggingService};
pub use login::LoginFlow;
pub use notify::{Notifier, Toast, ToastKind};
pub use otp::OtpService;
pub use reset::{ResetFlow, ResetPages};
pub use router::{Navigation, Page, Router};
pub use session::SessionStore;
pub use signup::SignupFlow;
