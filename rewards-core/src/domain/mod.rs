//! Core domain entities
//!
//! Session, staging and record types plus local validation. These are pure
//! data structures - no I/O or external dependencies.

pub mod credentials;
mod reset;
pub mod result;
pub mod rewards;
mod signup;
mod user;

pub use reset::{OtpPurpose, PendingReset, ResetKind, ResetStage};
pub use rewards::{
    DashboardStats, RedemptionKind, RedemptionRate, RedemptionRecord, RedemptionRequest, Survey,
    TransferRecord, TransferRequest,
};
pub use signup::{DeviceMetadata, PendingSignup, SignupForm, SignupStage};
pub use user::{User, UserId};
