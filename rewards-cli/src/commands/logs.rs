//! Logs command - inspect the local event log by flow

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use rewards_core::{EntryPoint, LogEntry, LoggingService};

use super::get_app_dir;
use crate::output::{self, create_table};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only events from one flow (signup, login, password_reset, pin_reset, dashboard)
        #[arg(long)]
        flow: Option<String>,
        /// Show only failures
        #[arg(long)]
        errors: bool,
    },
    /// Delete events older than a number of days
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Event and failure counts per flow
    Stats,
    /// Copy the log database to a file
    Export {
        /// Destination path
        output: PathBuf,
    },
}

fn open_log() -> Result<LoggingService> {
    let app_dir = get_app_dir()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn local_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Where an event happened: page for flow steps, command otherwise
fn location(entry: &LogEntry) -> String {
    entry
        .page
        .as_deref()
        .or(entry.command.as_deref())
        .unwrap_or("-")
        .to_string()
}

/// Error message with the backend endpoint it came from, if any
fn outcome(entry: &LogEntry) -> String {
    match (&entry.error_message, &entry.endpoint) {
        (Some(message), Some(endpoint)) => format!("{} ({})", message, endpoint).red().to_string(),
        (Some(message), None) => message.red().to_string(),
        (None, Some(endpoint)) => endpoint.dimmed().to_string(),
        (None, None) => String::new(),
    }
}

fn list(service: &LoggingService, limit: usize, flow: Option<&str>, errors: bool, json: bool) -> Result<()> {
    let entries = match flow {
        Some(flow) => service.get_by_flow(flow, limit, errors)?,
        None if errors => service.get_errors(limit)?,
        None => service.get_recent(limit)?,
    };

    if json {
        return output::print_json(&entries);
    }
    if entries.is_empty() {
        output::info("No events recorded.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Time", "Flow", "Event", "Where", "Outcome"]);
    for entry in &entries {
        table.add_row(vec![
            local_time(entry.timestamp),
            entry.flow.clone().unwrap_or_else(|| "-".to_string()),
            entry.event.clone(),
            location(entry),
            outcome(entry),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(service: &LoggingService, older_than_days: u64, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete events older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Nothing deleted.");
            return Ok(());
        }
    }

    let cutoff = chrono::Utc::now().timestamp_millis() - older_than_days as i64 * DAY_MS;
    let deleted = service.delete_before(cutoff)?;
    if json {
        output::print_json(&serde_json::json!({ "deleted": deleted }))
    } else {
        output::success(&format!("Deleted {} events", deleted));
        Ok(())
    }
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let errors = service.error_count()?;
    let flows = service.flow_summary()?;
    let path = service.db_path();

    if json {
        return output::print_json(&serde_json::json!({
            "total": total,
            "errors": errors,
            "flows": flows,
            "path": path.to_string_lossy(),
        }));
    }

    output::heading("Event log");
    println!("  {} events, {} failures", total, errors);
    println!("  {}", path.display().to_string().dimmed());

    if !flows.is_empty() {
        println!();
        let mut table = create_table();
        table.set_header(vec!["Flow", "Events", "Failures"]);
        for summary in flows {
            let failures = if summary.errors > 0 {
                summary.errors.to_string().red().to_string()
            } else {
                "0".to_string()
            };
            table.add_row(vec![summary.flow, summary.events.to_string(), failures]);
        }
        println!("{}", table);
    }
    Ok(())
}

pub fn run(command: LogsCommands, json: bool) -> Result<()> {
    let service = open_log()?;
    match command {
        LogsCommands::List { limit, flow, errors } => list(&service, limit, flow.as_deref(), errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
        } => clear(&service, older_than_days, force, json),
        LogsCommands::Stats => stats(&service, json),
        LogsCommands::Export { output: path } => {
            let written = service
                .export(&path)
                .with_context(|| format!("Failed to export logs to {}", path.display()))?;
            if json {
                output::print_json(&serde_json::json!({ "path": written.to_string_lossy() }))
            } else {
                output::success(&format!("Exported event log to {}", written.display()));
                Ok(())
            }
        }
    }
}
