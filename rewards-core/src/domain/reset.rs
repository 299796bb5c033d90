//! OTP purposes and reset staging data

use std::fmt;

use serde::{Deserialize, Serialize};

/// Purpose tag sent to the OTP endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Signup,
    PasswordReset,
    PinReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Signup => "signup",
            OtpPurpose::PasswordReset => "password_reset",
            OtpPurpose::PinReset => "pin_reset",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reset flow replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetKind {
    Password,
    Pin,
}

impl ResetKind {
    pub fn purpose(&self) -> OtpPurpose {
        match self {
            ResetKind::Password => OtpPurpose::PasswordReset,
            ResetKind::Pin => OtpPurpose::PinReset,
        }
    }

    /// Human label ("password" / "PIN")
    pub fn label(&self) -> &'static str {
        match self {
            ResetKind::Password => "password",
            ResetKind::Pin => "PIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetStage {
    EmailSubmitted,
    OtpVerified,
}

/// A reset in progress for one purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReset {
    pub email: String,
    pub purpose: OtpPurpose,
    pub stage: ResetStage,
}

impl PendingReset {
    pub fn new(email: impl Into<String>, purpose: OtpPurpose) -> Self {
        Self {
            email: email.into(),
            purpose,
            stage: ResetStage::EmailSubmitted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_wire_names() {
        assert_eq!(serde_json::to_value(OtpPurpose::PasswordReset).unwrap(), "password_reset");
        assert_eq!(OtpPurpose::PinReset.as_str(), "pin_reset");
        assert_eq!(OtpPurpose::Signup.to_string(), "signup");
    }

    #[test]
    fn test_reset_kind_purpose() {
        assert_eq!(ResetKind::Password.purpose(), OtpPurpose::PasswordReset);
        assert_eq!(ResetKind::Pin.purpose(), OtpPurpose::PinReset);
    }

    #[test]
    fn test_new_context_starts_at_email_submitted() {
        let ctx = PendingReset::new("a@b.com", OtpPurpose::PinReset);
        assert_eq!(ctx.stage, ResetStage::EmailSubmitted);
    }
}
