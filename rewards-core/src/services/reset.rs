//! Password and PIN reset flows
//!
//! Both resets share one shape: email, code, new value. A `ResetFlow` is
//! bound to one `ResetKind` and only ever reads or writes the context for
//! that kind's OTP purpose.

use crate::domain::credentials::{normalize_email, validate_password_pair, validate_pin_pair};
use crate::domain::result::{Error, Result};
use crate::domain::{PendingReset, ResetKind, ResetStage};
use crate::services::api::ApiClient;
use crate::services::otp::OtpService;
use crate::services::router::{route_for, Navigation, Page, Router};
use crate::services::session::SessionStore;

/// Pages of one reset flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPages {
    pub start: Page,
    pub otp: Page,
    pub set: Page,
}

impl ResetPages {
    pub fn for_kind(kind: ResetKind) -> Self {
        match kind {
            ResetKind::Password => Self {
                start: Page::ForgotPassword,
                otp: Page::PasswordOtp,
                set: Page::ResetPassword,
            },
            ResetKind::Pin => Self {
                start: Page::ForgotPin,
                otp: Page::PinOtp,
                set: Page::ResetPin,
            },
        }
    }
}

#[derive(Clone)]
pub struct ResetFlow {
    kind: ResetKind,
    pages: ResetPages,
    api: ApiClient,
    otp: OtpService,
    router: Router,
}

impl ResetFlow {
    pub fn new(kind: ResetKind, api: ApiClient) -> Self {
        Self {
            kind,
            pages: ResetPages::for_kind(kind),
            otp: OtpService::new(api.clone()),
            router: Router::new(api.session().clone()),
            api,
        }
    }

    pub fn kind(&self) -> ResetKind {
        self.kind
    }

    pub fn pages(&self) -> ResetPages {
        self.pages
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    fn context_for(&self, page: Page) -> Result<PendingReset> {
        self.router.enter(page)?;
        self.session()
            .pending_reset(self.kind.purpose())?
            .ok_or_else(|| Error::missing_context(route_for(page).missing, self.pages.start))
    }

    pub fn pending(&self) -> Result<Option<PendingReset>> {
        self.session().pending_reset(self.kind.purpose())
    }

    /// Request a reset code; the context is stored only once it was sent
    pub fn request(&self, email: &str) -> Result<Navigation> {
        self.router.enter(self.pages.start)?;
        let email = normalize_email(email)?;

        let message = self.otp.request(&email, self.kind.purpose())?;
        self.session()
            .save_pending_reset(&PendingReset::new(email, self.kind.purpose()))?;

        Ok(Navigation::to(self.pages.otp, message))
    }

    pub fn verify_otp(&self, code: &str) -> Result<Navigation> {
        let mut context = self.context_for(self.pages.otp)?;
        self.otp.verify(&context.email, code, self.kind.purpose())?;

        context.stage = ResetStage::OtpVerified;
        self.session().save_pending_reset(&context)?;

        Ok(Navigation::to(
            self.pages.set,
            format!("Code verified. Choose a new {}.", self.kind.label()),
        ))
    }

    pub fn resend_otp(&self) -> Result<Navigation> {
        let context = self.context_for(self.pages.otp)?;
        let message = self.otp.resend(&context.email, self.kind.purpose())?;
        Ok(Navigation::to(self.pages.otp, message))
    }

    /// Submit the new password or PIN
    ///
    /// Success clears the context and any session left over from before
    /// the reset.
    pub fn set_new_value(&self, value: &str, confirm: &str) -> Result<Navigation> {
        match self.kind {
            ResetKind::Password => validate_password_pair(value, confirm)?,
            ResetKind::Pin => validate_pin_pair(value, confirm)?,
        }
        let context = self.context_for(self.pages.set)?;

        match self.kind {
            ResetKind::Password => self.api.reset_password(&context.email, value)?,
            ResetKind::Pin => self.api.reset_pin(&context.email, value)?,
        };

        self.session().clear_pending_reset(self.kind.purpose())?;
        self.session().end_session()?;

        Ok(Navigation::to(
            Page::Login,
            format!(
                "Your {} has been reset. Please log in.",
                self.kind.label()
            ),
        ))
    }
}
