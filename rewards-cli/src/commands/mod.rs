//! CLI command implementations

pub mod config;
pub mod dashboard;
pub mod logs;
mod pages;
pub mod points;
mod prompt;
pub mod reset;
pub mod session;
pub mod signup;
pub mod surveys;

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rewards_core::services::Notifier;
use rewards_core::{
    EntryPoint, Error, LogEvent, LoggingService, OperationResult, Page,
    RewardsContext, ToastKind,
};
use serde::Serialize;

use crate::output;

/// Upper bound on pages visited by one interactive run
const MAX_STEPS: usize = 24;

/// Marker for failures already shown to the user
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("command failed")
    }
}

impl std::error::Error for Reported {}

/// Get the app directory from environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    rewards_core::config::app_dir(dirs::home_dir())
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

pub fn get_context() -> Result<RewardsContext> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;
    RewardsContext::new(&app_dir).context("Failed to initialize rewards client")
}

/// Flow a page belongs to, for the event log
fn flow_name(page: Page) -> &'static str {
    match page.flow_start() {
        Page::Signup => "signup",
        Page::ForgotPassword => "password_reset",
        Page::ForgotPin => "pin_reset",
        _ if page == Page::Dashboard => "dashboard",
        _ => "login",
    }
}

fn page_name(page: Page) -> String {
    serde_json::to_value(page)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// The command that opens `page`
pub fn command_for(page: Page) -> &'static str {
    match page {
        Page::Signup => "rw signup start",
        Page::SignupOtp => "rw signup verify <CODE>",
        Page::CreatePin => "rw signup pin",
        Page::Login => "rw login",
        Page::VerifyPin => "rw verify-pin",
        Page::ForgotPassword => "rw password forgot",
        Page::PasswordOtp => "rw password verify <CODE>",
        Page::ResetPassword => "rw password reset",
        Page::ForgotPin => "rw pin forgot",
        Page::PinOtp => "rw pin verify <CODE>",
        Page::ResetPin => "rw pin reset",
        Page::Dashboard => "rw dashboard",
    }
}

/// Per-invocation state shared by every command
pub struct App {
    pub ctx: RewardsContext,
    pub logger: Option<LoggingService>,
    pub json: bool,
    interactive: bool,
    notifier: Notifier,
}

impl App {
    pub fn new(command: &str, json: bool) -> Result<Self> {
        let ctx = get_context()?;
        let logger = get_logger();
        log_event(&logger, LogEvent::new("command_executed").with_command(command));
        Ok(Self::with_context(ctx, logger, json))
    }

    pub fn with_context(ctx: RewardsContext, logger: Option<LoggingService>, json: bool) -> Self {
        let interactive = !json && atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout);
        let notifier = ctx.notifier();

        Self {
            ctx,
            logger,
            json,
            interactive,
            notifier,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn log(&self, event: LogEvent) {
        log_event(&self.logger, event);
    }

    /// Show a notification now; JSON runs collect them instead
    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        if !self.json {
            output::toast(kind, &message);
        }
        self.notifier.push(kind, message);
    }

    /// Run `f` behind a spinner
    pub fn spin<T>(&self, message: &str, f: impl FnOnce() -> T) -> T {
        let spinner = if self.json {
            ProgressBar::hidden()
        } else {
            output::spinner(message)
        };
        let result = f();
        spinner.finish_and_clear();
        result
    }

    /// Print a JSON result along with the toasts raised so far
    pub fn emit<T: Serialize>(&mut self, result: OperationResult<T>) -> Result<()> {
        let toasts: Vec<_> = self
            .notifier
            .drain()
            .into_iter()
            .map(|t| serde_json::json!({"kind": t.kind, "message": t.message}))
            .collect();
        let result = if toasts.is_empty() {
            result
        } else {
            result.with_context("toasts", serde_json::Value::Array(toasts))
        };
        output::print_json(&result)
    }

    /// Stop before any prompt when `page` cannot be entered
    pub fn require(&mut self, page: Page, event: &str) -> Result<()> {
        match self.ctx.router.enter(page) {
            Ok(()) => Ok(()),
            Err(e) => self.report(
                LogEvent::new(format!("{}_failed", event)).with_page(page_name(page)),
                e,
            ),
        }
    }

    /// Log and show a core failure, then end the command
    pub fn report<T: Serialize>(&mut self, event: LogEvent, err: Error) -> Result<T> {
        self.log(event.with_core_error(&err));
        if self.json {
            self.emit(OperationResult::<T>::from(Err(err)))?;
        } else {
            self.toast(ToastKind::Error, err.to_string());
            if let Some(page) = err.redirect_to() {
                output::hint(&format!("Run `{}` to continue.", command_for(page)));
            }
        }
        Err(Reported.into())
    }

    /// Handle the outcome of a flow step taken on `page` and keep going
    ///
    /// Interactive terminals continue with the next page's prompts until the
    /// dashboard is reached. Other runs print the command for the next step.
    pub fn follow(&mut self, page: Page, result: pages::Step) -> Result<()> {
        let mut page = page;
        let mut result = result;

        for _ in 0..MAX_STEPS {
            let next = match result {
                Ok(nav) => {
                    self.log(
                        LogEvent::new(format!("{}_completed", page_name(page)))
                            .with_flow(flow_name(page))
                            .with_page(page_name(page)),
                    );
                    if self.json {
                        let next_command = command_for(nav.next);
                        return self.emit(
                            OperationResult::ok(nav).with_context("next", serde_json::json!(next_command)),
                        );
                    }
                    self.toast(ToastKind::Success, nav.message);
                    nav.next
                }
                Err(err) => {
                    let event = LogEvent::new(format!("{}_failed", page_name(page)))
                        .with_flow(flow_name(page))
                        .with_page(page_name(page));
                    if self.json || !self.interactive {
                        return self.report(event, err);
                    }
                    self.log(event.with_core_error(&err));
                    let redirect = err.redirect_to();
                    self.toast(ToastKind::Error, err.to_string());
                    match redirect {
                        Some(target) => {
                            std::thread::sleep(self.ctx.config.redirect_delay());
                            target
                        }
                        // Stay on the page and ask again
                        None => page,
                    }
                }
            };

            if !self.interactive {
                output::hint(&format!("Next: {}", command_for(next)));
                return Ok(());
            }

            if next == Page::Dashboard {
                return dashboard::show(self);
            }

            if let Some(logger) = &self.logger {
                let _ = logger.log_page(&page_name(next));
            }
            println!();
            output::heading(next.title());
            page = next;
            result = pages::run(self, next)?;
        }

        Ok(())
    }
}
