//! Login flow: credentials, then the PIN challenge

use crate::domain::credentials::{normalize_email, validate_password, validate_pin};
use crate::domain::result::Result;
use crate::domain::User;
use crate::services::api::ApiClient;
use crate::services::router::{Navigation, Page, Router};

#[derive(Clone)]
pub struct LoginFlow {
    api: ApiClient,
    router: Router,
}

impl LoginFlow {
    pub fn new(api: ApiClient) -> Self {
        Self {
            router: Router::new(api.session().clone()),
            api,
        }
    }

    /// Exchange credentials for a token; the session starts unverified
    pub fn login(&self, email: &str, password: &str) -> Result<Navigation> {
        self.router.enter(Page::Login)?;
        let email = normalize_email(email)?;
        validate_password(password)?;

        let (token, user) = self.api.login(&email, password)?;
        self.api.session().save(&token, &user)?;

        Ok(Navigation::to(
            Page::VerifyPin,
            format!("Welcome back, {}. Please enter your PIN.", user.display_name()),
        ))
    }

    pub fn verify_pin(&self, pin: &str) -> Result<Navigation> {
        validate_pin(pin)?;
        self.router.enter(Page::VerifyPin)?;

        self.api.verify_pin(pin)?;
        self.api.session().mark_pin_verified()?;
        Ok(Navigation::to(Page::Dashboard, "PIN verified."))
    }

    pub fn logout(&self) -> Result<Navigation> {
        self.api.session().clear()?;
        Ok(Navigation::to(Page::Login, "You have been logged out."))
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        self.api.session().current_user()
    }
}
