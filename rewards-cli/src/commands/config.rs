//! Config commands - show and change client settings
//!
//! These work on settings.json directly so a broken API URL can always be
//! repaired.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rewards_core::config::Config;
use rewards_core::LogEvent;

use super::{get_app_dir, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show,
    /// Set the backend API base URL
    SetUrl {
        /// Absolute http(s) URL, e.g. https://rewards.example.com
        url: String,
    },
}

pub fn run(command: ConfigCommands, json: bool) -> Result<()> {
    let app_dir = get_app_dir()?;
    let logger = get_logger();

    match command {
        ConfigCommands::Show => {
            log_event(&logger, LogEvent::new("command_executed").with_command("config show"));
            let config = Config::load(&app_dir)?;

            if json {
                let value = serde_json::json!({
                    "app_dir": app_dir.to_string_lossy(),
                    "api": config.api,
                    "ui": config.ui,
                    "device": config.device,
                    "api_url_overridden": config.api_url_overridden,
                });
                return output::print_json(&value);
            }

            println!("{}", "Settings".bold());
            println!("  App directory: {}", app_dir.display());
            let source = if config.api_url_overridden {
                " (from REWARDS_API_URL)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("  API URL: {}{}", config.api.base_url, source);
            match config.api.timeout_secs {
                Some(secs) => println!("  Request timeout: {}s", secs),
                None => println!("  Request timeout: none"),
            }
            println!("  Toast duration: {}ms", config.ui.toast_duration_ms);
            println!("  Redirect delay: {}ms", config.ui.redirect_delay_ms);
            println!(
                "  IP lookup: {}",
                config.device.ip_lookup_url.as_deref().unwrap_or("disabled")
            );
        }
        ConfigCommands::SetUrl { url } => {
            log_event(&logger, LogEvent::new("command_executed").with_command("config set-url"));
            let mut config = Config::load(&app_dir)?;
            if let Err(e) = config.set_api_base_url(&url) {
                log_event(
                    &logger,
                    LogEvent::new("config_failed").with_error(e.to_string()),
                );
                return Err(e);
            }
            config.save(&app_dir)?;

            if json {
                return output::print_json(&serde_json::json!({"api_url": config.api.base_url}));
            }
            output::success(&format!("API URL set to {}", config.api.base_url));
            if std::env::var(rewards_core::adapters::http::API_URL_ENV).is_ok() {
                output::warning("REWARDS_API_URL is set and still takes precedence.");
            }
        }
    }

    Ok(())
}
