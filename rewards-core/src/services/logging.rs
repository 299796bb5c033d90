//! Event log - structured client events in DuckDB
//!
//! Events go to `logs.duckdb` in the app directory. Only event names, flow
//! and page identifiers, endpoint paths and error messages are recorded.
//! Credentials, codes and tokens never reach this module.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::{Connection, Row, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::log_migrations::LOG_MIGRATIONS;

const LOG_DB_FILE: &str = "logs.duckdb";

/// Disambiguates ids generated within one millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Millisecond timestamp in the low bits, counter in the high 16
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Which front end wrote an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// An event to record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    /// Flow the event belongs to (signup, login, password_reset, ...)
    pub fn with_flow(mut self, flow: impl Into<String>) -> Self {
        self.flow = Some(flow.into());
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Endpoint path, without host or query
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }

    /// Record a core error: its message plus the status or redirect it
    /// carries
    pub fn with_core_error(self, error: &Error) -> Self {
        let details = match error {
            Error::Api { status, .. } => Some(format!("status={}", status)),
            Error::MissingContext { redirect, .. } => Some(format!("redirect={:?}", redirect)),
            Error::Validation(_) => Some("validation".to_string()),
            Error::NotAuthenticated => Some("not_authenticated".to_string()),
            _ => None,
        };
        // Failures raised before any request are tagged so they can be told apart
        let details = details.map(|d| if error.is_local() { format!("{},local", d) } else { d });
        let event = self.with_error(error.to_string());
        match details {
            Some(d) => event.with_error_details(d),
            None => event,
        }
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub flow: Option<String>,
    pub page: Option<String>,
    pub command: Option<String>,
    pub endpoint: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

/// Event and error counts for one flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub flow: String,
    pub events: u64,
    pub errors: u64,
}

const SELECT_COLUMNS: &str = "SELECT id, timestamp, entry_point, app_version, platform, \
     event, flow, page, command, endpoint, error_message, error_details FROM sys_logs";

fn entry_from_row(row: &Row<'_>) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        entry_point: row.get(2)?,
        app_version: row.get(3)?,
        platform: row.get(4)?,
        event: row.get(5)?,
        flow: row.get(6)?,
        page: row.get(7)?,
        command: row.get(8)?,
        endpoint: row.get(9)?,
        error_message: row.get(10)?,
        error_details: row.get(11)?,
    })
}

/// Structured event logging service
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `app_dir` and apply migrations
    pub fn new(
        app_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(app_dir)?;
        let db_path = app_dir.join(LOG_DB_FILE);
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        };
        service.run_migrations()?;
        Ok(service)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        let table_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM information_schema.tables WHERE table_name = 'sys_migrations'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !table_exists {
            if let Some((name, sql)) = LOG_MIGRATIONS.iter().find(|(n, _)| *n == "000_migrations.sql")
            {
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                    [name],
                )?;
            }
        }

        let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let applied: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        for (name, sql) in LOG_MIGRATIONS.iter() {
            if *name == "000_migrations.sql" || applied.iter().any(|a| a == name) {
                continue;
            }
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                [name],
            )?;
        }

        Ok(())
    }

    /// Record an event; entry point, version and platform are filled in
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform,
                event, flow, page, command, endpoint, error_message, error_details
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.flow,
                &event.page,
                &event.command,
                &event.endpoint,
                &event.error_message,
                &event.error_details,
            ],
        )?;
        Ok(())
    }

    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    pub fn log_page(&self, page: &str) -> Result<()> {
        self.log(LogEvent::new("page_opened").with_page(page))
    }

    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut log_event = LogEvent::new(event).with_error(message);
        if let Some(d) = details {
            log_event = log_event.with_error_details(d);
        }
        self.log(log_event)
    }

    fn query(&self, filter: &str, args: &[&dyn ToSql]) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let sql = format!(
            "{} {} ORDER BY timestamp DESC, id DESC LIMIT ?",
            SELECT_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(args, entry_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }

    /// Most recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query("", &[&(limit as i64)])
    }

    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query("WHERE error_message IS NOT NULL", &[&(limit as i64)])
    }

    /// Most recent entries of one flow (`signup`, `login`, `dashboard`...)
    pub fn get_by_flow(&self, flow: &str, limit: usize, errors_only: bool) -> Result<Vec<LogEntry>> {
        let filter = if errors_only {
            "WHERE flow = ? AND error_message IS NOT NULL"
        } else {
            "WHERE flow = ?"
        };
        self.query(filter, &[&flow, &(limit as i64)])
    }

    /// Per-flow totals, for entries tagged with a flow
    pub fn flow_summary(&self) -> Result<Vec<FlowSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT flow, COUNT(*), COUNT(error_message) FROM sys_logs \
             WHERE flow IS NOT NULL GROUP BY flow ORDER BY flow",
        )?;
        let summary = stmt
            .query_map([], |row| {
                Ok(FlowSummary {
                    flow: row.get(0)?,
                    events: row.get(1)?,
                    errors: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(summary)
    }

    pub fn error_count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_logs WHERE error_message IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete entries older than `timestamp_ms` (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// Copy the log database to `output_path`
    pub fn export(&self, output_path: &Path) -> Result<PathBuf> {
        let conn = self.conn()?;
        conn.execute("CHECKPOINT", [])?;
        std::fs::copy(&self.db_path, output_path)?;
        Ok(output_path.to_path_buf())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
