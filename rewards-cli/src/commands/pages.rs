//! Prompt-driven pages of the auth flows
//!
//! Each page asks for whatever its command line did not supply, then runs
//! one flow step behind a spinner. Prompt failures are `anyhow` errors; the
//! flow outcome is handed back for [`App::follow`] to act on.

use anyhow::Result;
use rewards_core::domain::result::Result as FlowResult;
use rewards_core::{Navigation, Page, ResetKind, SignupForm};

use super::prompt::{self, PASSWORD_ENV, PIN_ENV};
use super::App;
use crate::output;

pub type Step = FlowResult<Navigation>;

/// Show the page for `page` and run its step
pub fn run(app: &App, page: Page) -> Result<Step> {
    match page {
        Page::Signup => signup(app, None, None, None),
        Page::SignupOtp => signup_otp(app, None),
        Page::CreatePin => create_pin(app),
        Page::Login => login(app, None),
        Page::VerifyPin => verify_pin(app),
        Page::ForgotPassword => forgot(app, ResetKind::Password, None),
        Page::PasswordOtp => reset_otp(app, ResetKind::Password, None),
        Page::ResetPassword => reset_value(app, ResetKind::Password),
        Page::ForgotPin => forgot(app, ResetKind::Pin, None),
        Page::PinOtp => reset_otp(app, ResetKind::Pin, None),
        Page::ResetPin => reset_value(app, ResetKind::Pin),
        Page::Dashboard => Ok(app
            .ctx
            .router
            .enter(Page::Dashboard)
            .map(|_| Navigation::to(Page::Dashboard, "Welcome back"))),
    }
}

/// Refuse to prompt on a page whose guard fails
fn entry_check(app: &App, page: Page) -> Option<Step> {
    app.ctx.router.enter(page).err().map(Err)
}

pub fn signup(
    app: &App,
    name: Option<String>,
    email: Option<String>,
    referral_code: Option<String>,
) -> Result<Step> {
    if let Some(step) = entry_check(app, Page::Signup) {
        return Ok(step);
    }

    let interactive_referral = name.is_none() && app.is_interactive();
    let name = prompt::text(name, "Full name")?;
    let email = prompt::text(email, "Email")?;
    let (password, confirm) =
        prompt::secret_confirmed(PASSWORD_ENV, "Password", "Confirm password")?;
    let referral_code = if referral_code.is_none() && interactive_referral {
        prompt::optional_text(None, "Referral code (optional)")?
    } else {
        referral_code
    };

    let form = SignupForm {
        name,
        email,
        password,
        confirm_password: Some(confirm),
        referral_code,
    };

    Ok(app.spin("Sending verification code...", || {
        let device = app.ctx.device_metadata();
        app.ctx.signup.start(&form, device)
    }))
}

/// Verify the signup code; an empty code asks for a new one
pub fn signup_otp(app: &App, code: Option<String>) -> Result<Step> {
    if let Some(step) = entry_check(app, Page::SignupOtp) {
        return Ok(step);
    }
    if code.is_none() {
        if let Ok(Some(draft)) = app.ctx.signup.pending() {
            output::info(&format!("Enter the code sent to {}", draft.email));
        }
    }

    match prompt::optional_text(code, "Verification code (empty to resend)")? {
        Some(code) => Ok(app.spin("Verifying...", || app.ctx.signup.verify_otp(&code))),
        None => resend_signup(app),
    }
}

pub fn resend_signup(app: &App) -> Result<Step> {
    Ok(app.spin("Sending a new code...", || app.ctx.signup.resend_otp()))
}

pub fn create_pin(app: &App) -> Result<Step> {
    if let Some(step) = entry_check(app, Page::CreatePin) {
        return Ok(step);
    }
    let (pin, confirm) = prompt::secret_confirmed(PIN_ENV, "Choose a 4-digit PIN", "Confirm PIN")?;
    Ok(app.spin("Creating account...", || app.ctx.signup.create_pin(&pin, &confirm)))
}

pub fn login(app: &App, email: Option<String>) -> Result<Step> {
    if let Some(step) = entry_check(app, Page::Login) {
        return Ok(step);
    }
    let email = prompt::text(email, "Email")?;
    let password = prompt::secret(PASSWORD_ENV, "Password")?;
    Ok(app.spin("Signing in...", || app.ctx.login.login(&email, &password)))
}

pub fn verify_pin(app: &App) -> Result<Step> {
    if let Some(step) = entry_check(app, Page::VerifyPin) {
        return Ok(step);
    }
    let pin = prompt::secret(PIN_ENV, "PIN")?;
    Ok(app.spin("Checking PIN...", || app.ctx.login.verify_pin(&pin)))
}

pub fn forgot(app: &App, kind: ResetKind, email: Option<String>) -> Result<Step> {
    let flow = app.ctx.reset(kind);
    if let Some(step) = entry_check(app, flow.pages().start) {
        return Ok(step);
    }
    let email = prompt::text(email, "Account email")?;
    Ok(app.spin("Sending reset code...", || flow.request(&email)))
}

/// Verify a reset code; an empty code asks for a new one
pub fn reset_otp(app: &App, kind: ResetKind, code: Option<String>) -> Result<Step> {
    let flow = app.ctx.reset(kind);
    if let Some(step) = entry_check(app, flow.pages().otp) {
        return Ok(step);
    }
    if code.is_none() {
        if let Ok(Some(context)) = flow.pending() {
            output::info(&format!("Enter the code sent to {}", context.email));
        }
    }

    match prompt::optional_text(code, "Reset code (empty to resend)")? {
        Some(code) => Ok(app.spin("Verifying...", || flow.verify_otp(&code))),
        None => resend_reset(app, kind),
    }
}

pub fn resend_reset(app: &App, kind: ResetKind) -> Result<Step> {
    let flow = app.ctx.reset(kind);
    Ok(app.spin("Sending a new code...", || flow.resend_otp()))
}

pub fn reset_value(app: &App, kind: ResetKind) -> Result<Step> {
    let flow = app.ctx.reset(kind);
    if let Some(step) = entry_check(app, flow.pages().set) {
        return Ok(step);
    }
    let (value, confirm) = match kind {
        ResetKind::Password => {
            prompt::secret_confirmed(PASSWORD_ENV, "New password", "Confirm new password")?
        }
        ResetKind::Pin => prompt::secret_confirmed(PIN_ENV, "New 4-digit PIN", "Confirm new PIN")?,
    };
    Ok(app.spin("Saving...", || flow.set_new_value(&value, &confirm)))
}
