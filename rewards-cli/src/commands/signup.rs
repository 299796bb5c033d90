//! Signup commands - create an account in three steps

use anyhow::Result;
use clap::Subcommand;
use rewards_core::Page;

use super::{pages, App};

#[derive(Subcommand)]
pub enum SignupCommands {
    /// Enter your details and request an email code
    Start {
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Referral code from another user
        #[arg(long)]
        referral: Option<String>,
    },
    /// Verify the email code
    Verify {
        /// Code from the email; prompted when omitted
        code: Option<String>,
    },
    /// Send a new email code
    Resend,
    /// Choose a PIN and create the account
    Pin,
}

pub fn run(command: SignupCommands, json: bool) -> Result<()> {
    match command {
        SignupCommands::Start {
            name,
            email,
            referral,
        } => {
            let mut app = App::new("signup start", json)?;
            let step = pages::signup(&app, name, email, referral)?;
            app.follow(Page::Signup, step)
        }
        SignupCommands::Verify { code } => {
            let mut app = App::new("signup verify", json)?;
            let step = pages::signup_otp(&app, code)?;
            app.follow(Page::SignupOtp, step)
        }
        SignupCommands::Resend => {
            let mut app = App::new("signup resend", json)?;
            let step = pages::resend_signup(&app)?;
            app.follow(Page::SignupOtp, step)
        }
        SignupCommands::Pin => {
            let mut app = App::new("signup pin", json)?;
            let step = pages::create_pin(&app)?;
            app.follow(Page::CreatePin, step)
        }
    }
}
