//! Session commands - sign in, check the PIN, sign out

use anyhow::Result;
use colored::Colorize;
use rewards_core::{LogEvent, OperationResult, Page, ToastKind};
use serde::Serialize;

use super::{command_for, pages, App};

#[derive(Serialize)]
struct SessionStatus {
    authenticated: bool,
    pin_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<rewards_core::User>,
    next: Page,
}

fn session_status(app: &App) -> rewards_core::domain::result::Result<SessionStatus> {
    let session = &app.ctx.session;
    Ok(SessionStatus {
        authenticated: session.token()?.is_some(),
        pin_verified: session.is_pin_verified()?,
        user: session.current_user()?,
        next: app.ctx.router.landing()?,
    })
}

pub fn login(email: Option<String>, json: bool) -> Result<()> {
    let mut app = App::new("login", json)?;
    let step = pages::login(&app, email)?;
    app.follow(Page::Login, step)
}

pub fn verify_pin(json: bool) -> Result<()> {
    let mut app = App::new("verify-pin", json)?;
    let step = pages::verify_pin(&app)?;
    app.follow(Page::VerifyPin, step)
}

pub fn logout(json: bool) -> Result<()> {
    let mut app = App::new("logout", json)?;
    match app.ctx.login.logout() {
        Ok(nav) => {
            app.log(LogEvent::new("logged_out").with_flow("login"));
            app.toast(ToastKind::Success, nav.message.clone());
            if app.json {
                app.emit(OperationResult::ok(nav))?;
            }
            Ok(())
        }
        Err(e) => app.report(LogEvent::new("logout_failed").with_flow("login"), e),
    }
}

pub fn whoami(json: bool) -> Result<()> {
    let mut app = App::new("whoami", json)?;

    let status = match session_status(&app) {
        Ok(status) => status,
        Err(e) => return app.report(LogEvent::new("whoami_failed"), e),
    };

    if app.json {
        return app.emit(OperationResult::ok(status));
    }

    match &status.user {
        Some(user) if status.authenticated => {
            println!("{} {}", "Signed in as".bold(), user.display_name());
            println!("  Email: {}", user.email);
            println!("  User ID: {}", user.id);
            let pin = if status.pin_verified {
                "verified".green()
            } else {
                "not verified".yellow()
            };
            println!("  PIN: {}", pin);
        }
        _ => println!("Not signed in."),
    }
    if status.next != Page::Dashboard {
        crate::output::hint(&format!("Next: {}", command_for(status.next)));
    }
    Ok(())
}
