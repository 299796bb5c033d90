//! Rewards CLI - earn, transfer and redeem points from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rewards_core::ResetKind;

mod commands;
mod output;

use commands::{config, dashboard, logs, points, reset, session, signup, surveys, Reported};

/// Rewards - points, transfers and redemptions in your terminal
#[derive(Parser)]
#[command(name = "rw", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        #[command(subcommand)]
        command: signup::SignupCommands,
    },

    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(long)]
        email: Option<String>,
    },

    /// Confirm your PIN after signing in
    VerifyPin,

    /// Sign out and forget the session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Reset a forgotten password
    Password {
        #[command(subcommand)]
        command: reset::ResetCommands,
    },

    /// Reset a forgotten PIN
    Pin {
        #[command(subcommand)]
        command: reset::ResetCommands,
    },

    /// Show balance, rates, history and surveys
    Dashboard,

    /// Send points to another user
    Transfer {
        /// Recipient email
        #[arg(long)]
        to: Option<String>,
        /// Points to send
        #[arg(long)]
        amount: Option<i64>,
    },

    /// Redeem points for bitcoin or a gift card
    Redeem {
        /// Payout type (bitcoin, gift_card)
        #[arg(long = "type")]
        kind: Option<String>,
        /// Points to redeem
        #[arg(long)]
        points: Option<i64>,
        /// Bitcoin wallet address
        #[arg(long)]
        wallet: Option<String>,
        /// Gift card delivery email
        #[arg(long)]
        email: Option<String>,
    },

    /// List and complete surveys
    Surveys {
        #[command(subcommand)]
        command: surveys::SurveyCommands,
    },

    /// Show transfer or redemption history
    History {
        #[command(subcommand)]
        command: points::HistoryCommands,
    },

    /// Show redemption rates
    Rates,

    /// View and manage the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is::<Reported>() {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Signup { command } => signup::run(command, json),
        Commands::Login { email } => session::login(email, json),
        Commands::VerifyPin => session::verify_pin(json),
        Commands::Logout => session::logout(json),
        Commands::Whoami => session::whoami(json),
        Commands::Password { command } => reset::run(ResetKind::Password, command, json),
        Commands::Pin { command } => reset::run(ResetKind::Pin, command, json),
        Commands::Dashboard => dashboard::run(json),
        Commands::Transfer { to, amount } => points::transfer(to, amount, json),
        Commands::Redeem {
            kind,
            points: amount,
            wallet,
            email,
        } => points::redeem(kind, amount, wallet, email, json),
        Commands::Surveys { command } => surveys::run(command, json),
        Commands::History { command } => points::history(command, json),
        Commands::Rates => dashboard::rates(json),
        Commands::Logs { command } => logs::run(command, json),
        Commands::Config { command } => config::run(command, json),
    }
}
