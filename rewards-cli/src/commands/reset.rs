//! Reset commands - recover a forgotten password or PIN
//!
//! `rw password ...` and `rw pin ...` share these subcommands.

use anyhow::Result;
use clap::Subcommand;
use rewards_core::services::ResetPages;
use rewards_core::ResetKind;

use super::{pages, App};

#[derive(Subcommand)]
pub enum ResetCommands {
    /// Request a reset code by email
    Forgot {
        /// Account email
        #[arg(long)]
        email: Option<String>,
    },
    /// Verify the reset code
    Verify {
        /// Code from the email; prompted when omitted
        code: Option<String>,
    },
    /// Send a new reset code
    Resend,
    /// Set the new value
    Reset,
}

pub fn run(kind: ResetKind, command: ResetCommands, json: bool) -> Result<()> {
    let pages_for = ResetPages::for_kind(kind);
    let noun = match kind {
        ResetKind::Password => "password",
        ResetKind::Pin => "pin",
    };

    match command {
        ResetCommands::Forgot { email } => {
            let mut app = App::new(&format!("{} forgot", noun), json)?;
            let step = pages::forgot(&app, kind, email)?;
            app.follow(pages_for.start, step)
        }
        ResetCommands::Verify { code } => {
            let mut app = App::new(&format!("{} verify", noun), json)?;
            let step = pages::reset_otp(&app, kind, code)?;
            app.follow(pages_for.otp, step)
        }
        ResetCommands::Resend => {
            let mut app = App::new(&format!("{} resend", noun), json)?;
            let step = pages::resend_reset(&app, kind)?;
            app.follow(pages_for.otp, step)
        }
        ResetCommands::Reset => {
            let mut app = App::new(&format!("{} reset", noun), json)?;
            let step = pages::reset_value(&app, kind)?;
            app.follow(pages_for.set, step)
        }
    }
}
