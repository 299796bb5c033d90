//! Signup staging data

use serde::{Deserialize, Serialize};

/// Progress of a signup through its steps
///
/// Ordered: a later stage satisfies any guard that asks for an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStage {
    Draft,
    OtpRequested,
    OtpVerified,
    PinSet,
    Registered,
}

/// Opaque client metadata sent along with a signup
///
/// None of these fields carry security value; they are passed through to
/// the backend as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub device_fingerprint: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// Profile fields collected by the signup form
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub referral_code: Option<String>,
}

/// A signup in progress, held in the session store until registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(flatten)]
    pub device: DeviceMetadata,
    pub stage: SignupStage,
}

impl PendingSignup {
    /// Body for `POST /auth/signup`
    ///
    /// Returns `None` until a PIN has been attached.
    pub fn registration_body(&self) -> Option<serde_json::Value> {
        let pin = self.pin.as_ref()?;
        let mut body = serde_json::json!({
            "name": self.name,
            "email": self.email,
            "password": self.password,
            "pin": pin,
            "device_fingerprint": self.device.device_fingerprint,
            "ip_address": self.device.ip_address,
            "user_agent": self.device.user_agent,
        });
        if let Some(code) = &self.referral_code {
            body["referral_code"] = serde_json::json!(code);
        }
        Some(body)
    }
}
