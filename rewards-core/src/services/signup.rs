//! Signup flow: profile, email code, PIN, registration
//!
//! The draft is persisted before the first request so a crash between
//! steps can be resumed. Each step checks the draft's stage through the
//! router before it talks to the backend.

use crate::domain::credentials::{
    normalize_email, require_non_empty, validate_password, validate_password_pair,
    validate_pin_pair,
};
use crate::domain::result::{Error, Result};
use crate::domain::{DeviceMetadata, OtpPurpose, PendingSignup, SignupForm, SignupStage};
use crate::services::api::ApiClient;
use crate::services::otp::OtpService;
use crate::services::router::{route_for, Navigation, Page, Router};
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct SignupFlow {
    api: ApiClient,
    otp: OtpService,
    router: Router,
}

impl SignupFlow {
    pub fn new(api: ApiClient) -> Self {
        Self {
            otp: OtpService::new(api.clone()),
            router: Router::new(api.session().clone()),
            api,
        }
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// The draft for `page`, after its guard has passed
    fn draft_for(&self, page: Page) -> Result<PendingSignup> {
        self.router.enter(page)?;
        self.session()
            .pending_signup()?
            .ok_or_else(|| Error::missing_context(route_for(page).missing, Page::Signup))
    }

    pub fn pending(&self) -> Result<Option<PendingSignup>> {
        self.session().pending_signup()
    }

    /// Validate the profile, store a draft and request the email code
    ///
    /// Starting again replaces any earlier draft.
    pub fn start(&self, form: &SignupForm, device: DeviceMetadata) -> Result<Navigation> {
        self.router.enter(Page::Signup)?;

        let name = require_non_empty(&form.name, "Name")?;
        let email = normalize_email(&form.email)?;
        match &form.confirm_password {
            Some(confirm) => validate_password_pair(&form.password, confirm)?,
            None => validate_password(&form.password)?,
        }
        let referral_code = form
            .referral_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        let mut draft = PendingSignup {
            name,
            email,
            password: form.password.clone(),
            pin: None,
            referral_code,
            device,
            stage: SignupStage::Draft,
        };
        self.session().save_pending_signup(&draft)?;

        let message = self.otp.request(&draft.email, OtpPurpose::Signup)?;
        draft.stage = SignupStage::OtpRequested;
        self.session().save_pending_signup(&draft)?;

        Ok(Navigation::to(Page::SignupOtp, message))
    }

    pub fn verify_otp(&self, code: &str) -> Result<Navigation> {
        let mut draft = self.draft_for(Page::SignupOtp)?;
        self.otp.verify(&draft.email, code, OtpPurpose::Signup)?;

        draft.stage = draft.stage.max(SignupStage::OtpVerified);
        self.session().save_pending_signup(&draft)?;

        Ok(Navigation::to(
            Page::CreatePin,
            "Email verified. Now create your 4-digit PIN.",
        ))
    }

    pub fn resend_otp(&self) -> Result<Navigation> {
        let draft = self.draft_for(Page::SignupOtp)?;
        let message = self.otp.resend(&draft.email, OtpPurpose::Signup)?;
        Ok(Navigation::to(Page::SignupOtp, message))
    }

    /// Attach the PIN and register the account
    ///
    /// A failed registration leaves the draft at `PinSet` so this step can
    /// be retried without repeating email verification.
    pub fn create_pin(&self, pin: &str, confirm: &str) -> Result<Navigation> {
        validate_pin_pair(pin, confirm)?;
        let mut draft = self.draft_for(Page::CreatePin)?;

        draft.pin = Some(pin.to_string());
        draft.stage = SignupStage::PinSet;
        self.session().save_pending_signup(&draft)?;

        let body = draft
            .registration_body()
            .ok_or_else(|| Error::missing_context("PIN was not stored", Page::CreatePin))?;
        self.api.signup(body)?;

        self.session().clear_pending_signup()?;
        Ok(Navigation::to(
            Page::Login,
            "Account created successfully. Please log in.",
        ))
    }
}
