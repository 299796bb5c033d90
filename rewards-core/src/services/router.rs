//! Page routing table
//!
//! Each screen of the client is a `Page`. `ROUTES` maps every page to the
//! context it needs on entry and the page that starts its flow. Flows call
//! `Router::enter` before doing anything else, so a step reached without
//! its staging data fails with `Error::MissingContext` and never issues a
//! request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{OtpPurpose, ResetStage, SignupStage};
use crate::services::session::SessionStore;

/// A screen of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Signup,
    SignupOtp,
    CreatePin,
    Login,
    VerifyPin,
    ForgotPassword,
    PasswordOtp,
    ResetPassword,
    ForgotPin,
    PinOtp,
    ResetPin,
    Dashboard,
}

impl Page {
    pub const ALL: [Page; 12] = [
        Page::Signup,
        Page::SignupOtp,
        Page::CreatePin,
        Page::Login,
        Page::VerifyPin,
        Page::ForgotPassword,
        Page::PasswordOtp,
        Page::ResetPassword,
        Page::ForgotPin,
        Page::PinOtp,
        Page::ResetPin,
        Page::Dashboard,
    ];

    pub fn title(&self) -> &'static str {
        route_for(*self).title
    }

    /// First page of the flow this page belongs to
    pub fn flow_start(&self) -> Page {
        route_for(*self).flow_start
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Context a page requires on entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Open,
    /// Signup draft at or beyond the given stage
    SignupDraft(SignupStage),
    /// Reset context for the purpose at or beyond the given stage
    ResetContext(OtpPurpose, ResetStage),
    /// An access token, PIN not yet required
    Token,
    /// Access token and a verified PIN
    Authenticated,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub page: Page,
    pub title: &'static str,
    pub guard: Guard,
    pub flow_start: Page,
    /// Shown when the guard fails
    pub missing: &'static str,
}

/// Routing table, indexed by `Page` discriminant
pub const ROUTES: &[Route] = &[
    Route {
        page: Page::Signup,
        title: "Sign up",
        guard: Guard::Open,
        flow_start: Page::Signup,
        missing: "",
    },
    Route {
        page: Page::SignupOtp,
        title: "Verify email",
        guard: Guard::SignupDraft(SignupStage::OtpRequested),
        flow_start: Page::Signup,
        missing: "No pending signup found. Please sign up again.",
    },
    Route {
        page: Page::CreatePin,
        title: "Create PIN",
        guard: Guard::SignupDraft(SignupStage::OtpVerified),
        flow_start: Page::Signup,
        missing: "Please verify your email before creating a PIN.",
    },
    Route {
        page: Page::Login,
        title: "Log in",
        guard: Guard::Open,
        flow_start: Page::Login,
        missing: "",
    },
    Route {
        page: Page::VerifyPin,
        title: "Verify PIN",
        guard: Guard::Token,
        flow_start: Page::Login,
        missing: "Session expired. Please log in again.",
    },
    Route {
        page: Page::ForgotPassword,
        title: "Forgot password",
        guard: Guard::Open,
        flow_start: Page::ForgotPassword,
        missing: "",
    },
    Route {
        page: Page::PasswordOtp,
        title: "Verify password reset code",
        guard: Guard::ResetContext(OtpPurpose::PasswordReset, ResetStage::EmailSubmitted),
        flow_start: Page::ForgotPassword,
        missing: "No password reset in progress. Please request a new code.",
    },
    Route {
        page: Page::ResetPassword,
        title: "Set new password",
        guard: Guard::ResetContext(OtpPurpose::PasswordReset, ResetStage::OtpVerified),
        flow_start: Page::ForgotPassword,
        missing: "Please verify your reset code first.",
    },
    Route {
        page: Page::ForgotPin,
        title: "Forgot PIN",
        guard: Guard::Open,
        flow_start: Page::ForgotPin,
        missing: "",
    },
    Route {
        page: Page::PinOtp,
        title: "Verify PIN reset code",
        guard: Guard::ResetContext(OtpPurpose::PinReset, ResetStage::EmailSubmitted),
        flow_start: Page::ForgotPin,
        missing: "No PIN reset in progress. Please request a new code.",
    },
    Route {
        page: Page::ResetPin,
        title: "Set new PIN",
        guard: Guard::ResetContext(OtpPurpose::PinReset, ResetStage::OtpVerified),
        flow_start: Page::ForgotPin,
        missing: "Please verify your reset code first.",
    },
    Route {
        page: Page::Dashboard,
        title: "Dashboard",
        guard: Guard::Authenticated,
        flow_start: Page::Login,
        missing: "Please log in to continue.",
    },
];

pub fn route_for(page: Page) -> &'static Route {
    &ROUTES[page as usize]
}

/// Outcome of a flow step: where to go next and what to tell the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub next: Page,
    pub message: String,
}

impl Navigation {
    pub fn to(next: Page, message: impl Into<String>) -> Self {
        Self {
            next,
            message: message.into(),
        }
    }
}

/// Checks page guards against the session store
#[derive(Clone)]
pub struct Router {
    session: SessionStore,
}

impl Router {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Whether the session currently satisfies `guard`
    pub fn satisfied(&self, guard: Guard) -> Result<bool> {
        Ok(match guard {
            Guard::Open => true,
            Guard::SignupDraft(stage) => self
                .session
                .pending_signup()?
                .is_some_and(|draft| draft.stage >= stage),
            Guard::ResetContext(purpose, stage) => self
                .session
                .pending_reset(purpose)?
                .is_some_and(|ctx| ctx.stage >= stage),
            Guard::Token => self.session.token()?.is_some(),
            Guard::Authenticated => self.session.is_authenticated()?,
        })
    }

    /// Check the guard for `page`
    ///
    /// On failure the error carries the page to fall back to. A dashboard
    /// visit with a token but no PIN check goes to PIN verification rather
    /// than back to login.
    pub fn enter(&self, page: Page) -> Result<()> {
        let route = route_for(page);
        if self.satisfied(route.guard)? {
            return Ok(());
        }

        if route.guard == Guard::Authenticated && self.session.token()?.is_some() {
            return Err(Error::missing_context(
                "Please verify your PIN to continue.",
                Page::VerifyPin,
            ));
        }

        Err(Error::missing_context(route.missing, route.flow_start))
    }

    /// Page a fresh start should land on
    pub fn landing(&self) -> Result<Page> {
        if self.session.is_authenticated()? {
            Ok(Page::Dashboard)
        } else if self.session.token()?.is_some() {
            Ok(Page::VerifyPin)
        } else {
            Ok(Page::Login)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::memory_store::MemorySessionStorage;
    use crate::domain::{DeviceMetadata, PendingReset, PendingSignup, User};

    fn setup() -> (SessionStore, Router) {
        let session = SessionStore::new(Arc::new(MemorySessionStorage::new()));
        let router = Router::new(session.clone());
        (session, router)
    }

    fn draft(stage: SignupStage) -> PendingSignup {
        PendingSignup {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
            pin: None,
            referral_code: None,
            device: DeviceMetadata {
                device_fingerprint: "fp".into(),
                ip_address: "unknown".into(),
                user_agent: "ua".into(),
            },
            stage,
        }
    }

    #[test]
    fn test_table_is_indexed_by_page() {
        assert_eq!(ROUTES.len(), Page::ALL.len());
        for (i, page) in Page::ALL.iter().enumerate() {
            assert_eq!(ROUTES[i].page, *page);
            assert_eq!(route_for(*page).page, *page);
        }
    }

    #[test]
    fn test_guarded_pages_have_messages() {
        for route in ROUTES {
            if route.guard != Guard::Open {
                assert!(!route.missing.is_empty(), "{:?} has no message", route.page);
                assert_ne!(route.flow_start, route.page);
            }
        }
    }

    #[test]
    fn test_open_pages_always_enter() {
        let (_, router) = setup();
        for page in [Page::Signup, Page::Login, Page::ForgotPassword, Page::ForgotPin] {
            router.enter(page).unwrap();
        }
    }

    #[test]
    fn test_otp_page_without_draft_redirects_to_signup() {
        let (_, router) = setup();
        let err = router.enter(Page::SignupOtp).unwrap_err();
        assert_eq!(err.redirect_to(), Some(Page::Signup));
    }

    #[test]
    fn test_signup_stages_gate_pages() {
        let (session, router) = setup();
        session.save_pending_signup(&draft(SignupStage::Draft)).unwrap();
        assert!(router.enter(Page::SignupOtp).is_err());

        session.save_pending_signup(&draft(SignupStage::OtpRequested)).unwrap();
        router.enter(Page::SignupOtp).unwrap();
        assert!(router.enter(Page::CreatePin).is_err());

        session.save_pending_signup(&draft(SignupStage::PinSet)).unwrap();
        router.enter(Page::CreatePin).unwrap();
    }

    #[test]
    fn test_reset_context_does_not_cross_purposes() {
        let (session, router) = setup();
        let mut ctx = PendingReset::new("a@b.com", OtpPurpose::PasswordReset);
        ctx.stage = ResetStage::OtpVerified;
        session.save_pending_reset(&ctx).unwrap();

        router.enter(Page::PasswordOtp).unwrap();
        router.enter(Page::ResetPassword).unwrap();

        let err = router.enter(Page::PinOtp).unwrap_err();
        assert_eq!(err.redirect_to(), Some(Page::ForgotPin));
        assert!(router.enter(Page::ResetPin).is_err());
        assert!(router.enter(Page::SignupOtp).is_err());
    }

    #[test]
    fn test_dashboard_requires_pin_after_login() {
        let (session, router) = setup();
        assert_eq!(router.enter(Page::Dashboard).unwrap_err().redirect_to(), Some(Page::Login));
        assert_eq!(router.landing().unwrap(), Page::Login);

        session.save("t", &User::new(1, "a@b.com")).unwrap();
        router.enter(Page::VerifyPin).unwrap();
        let err = router.enter(Page::Dashboard).unwrap_err();
        assert_eq!(err.redirect_to(), Some(Page::VerifyPin));
        assert_eq!(router.landing().unwrap(), Page::VerifyPin);

        session.mark_pin_verified().unwrap();
        router.enter(Page::Dashboard).unwrap();
        assert_eq!(router.landing().unwrap(), Page::Dashboard);
    }

    #[test]
    fn test_page_serializes_snake_case() {
        assert_eq!(serde_json::to_value(Page::CreatePin).unwrap(), "create_pin");
        assert_eq!(Page::PinOtp.flow_start(), Page::ForgotPin);
        assert_eq!(Page::Dashboard.to_string(), "Dashboard");
    }
}
