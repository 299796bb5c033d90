//! One-time code requests and checks

use crate::domain::credentials::normalize_otp;
use crate::domain::result::Result;
use crate::domain::OtpPurpose;
use crate::services::api::{response_message, ApiClient};

/// OTP service, shared by signup and both reset flows
#[derive(Clone)]
pub struct OtpService {
    api: ApiClient,
}

impl OtpService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Ask the backend to send a code; returns the message to show
    pub fn request(&self, email: &str, purpose: OtpPurpose) -> Result<String> {
        let response = self.api.request_otp(email, purpose)?;
        Ok(response_message(&response)
            .unwrap_or_else(|| format!("Verification code sent to {}", email)))
    }

    pub fn verify(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<()> {
        let code = normalize_otp(code)?;
        self.api.verify_otp(email, &code, purpose)?;
        Ok(())
    }

    /// Same request again; callers keep their flow state as is
    pub fn resend(&self, email: &str, purpose: OtpPurpose) -> Result<String> {
        let response = self.api.request_otp(email, purpose)?;
        Ok(response_message(&response)
            .unwrap_or_else(|| format!("A new code has been sent to {}", email)))
    }
}
