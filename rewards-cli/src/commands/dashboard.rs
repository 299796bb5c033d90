//! Dashboard command - balance, rates, history and surveys at a glance

use anyhow::Result;
use colored::Colorize;
use rewards_core::domain::{RedemptionRate, RedemptionRecord, Survey, TransferRecord};
use rewards_core::services::DashboardSnapshot;
use rewards_core::{DashboardStats, LogEvent, OperationResult, Widget};
use rust_decimal::Decimal;

use super::App;
use crate::output::{self, create_table, format_created, format_points};

/// Rows shown per history table on the dashboard
pub(super) const RECENT_ROWS: usize = 5;

pub fn run(json: bool) -> Result<()> {
    let mut app = App::new("dashboard", json)?;
    show(&mut app)
}

/// Load every widget and render what arrived
pub fn show(app: &mut App) -> Result<()> {
    let snapshot = match app.spin("Loading dashboard...", || app.ctx.dashboard.load()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return app.report(
                LogEvent::new("dashboard_failed")
                    .with_flow("dashboard")
                    .with_page("dashboard"),
                e,
            )
        }
    };

    for (widget, message) in snapshot.failures() {
        app.log(
            LogEvent::new("widget_failed")
                .with_page("dashboard")
                .with_endpoint(widget)
                .with_error(message),
        );
    }

    if app.json {
        return app.emit(OperationResult::ok(snapshot));
    }

    render(&snapshot);
    Ok(())
}

fn render(snapshot: &DashboardSnapshot) {
    if let Some(user) = &snapshot.user {
        output::heading(&format!("Welcome, {}", user.display_name()));
        println!();
    }

    let me = snapshot.user.as_ref().map(|u| u.email.as_str());

    section("Points", &snapshot.stats, print_stats);
    section("Redemption rates", &snapshot.rates, |rates| print_rates(rates));
    section("Recent redemptions", &snapshot.redemptions, |records| {
        print_redemptions(&records[..records.len().min(RECENT_ROWS)])
    });
    section("Recent transfers", &snapshot.transfers, |records| {
        print_transfers(&records[..records.len().min(RECENT_ROWS)], me)
    });
    section("Surveys", &snapshot.surveys, |surveys| print_surveys(surveys));
}

/// Print one widget, or its error in place of the content
fn section<T>(title: &str, widget: &Widget<T>, print: impl FnOnce(&T)) {
    println!("{}", title.bold());
    match widget {
        Widget::Loaded(value) => print(value),
        Widget::Failed(message) => output::warning(&format!("  Could not load: {}", message)),
    }
    println!();
}

pub(super) fn print_stats(stats: &DashboardStats) {
    let mut table = create_table();
    table.set_header(vec!["", "Points"]);
    table.add_row(vec!["Total".to_string(), format_points(stats.total_points)]);

    let optional = [
        ("Available", stats.available_points),
        ("Pending", stats.pending_points),
        ("Lifetime earned", stats.lifetime_earned),
        ("Lifetime redeemed", stats.lifetime_redeemed),
        ("Surveys completed", stats.surveys_completed),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            table.add_row(vec![label.to_string(), format_points(value)]);
        }
    }
    println!("{}", table);

    if let Some(code) = &stats.referral_code {
        println!("Referral code: {}", code.cyan());
    }
}

pub(super) fn print_rates(rates: &[RedemptionRate]) {
    if rates.is_empty() {
        println!("No redemption options available.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Type", "Rate", "Minimum", "Description"]);
    for rate in rates {
        table.add_row(vec![
            rate.kind.clone(),
            format_rate(rate.rate),
            rate.min_points.map(format_points).unwrap_or_else(|| "-".to_string()),
            rate.description.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
}

fn format_rate(rate: Decimal) -> String {
    rate.normalize().to_string()
}

pub(super) fn print_redemptions(records: &[RedemptionRecord]) {
    if records.is_empty() {
        println!("No redemptions yet.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Type", "Points", "Status", "Destination"]);
    for record in records {
        let destination = record
            .wallet_address
            .as_deref()
            .or(record.email_address.as_deref())
            .unwrap_or("-");
        table.add_row(vec![
            format_created(record.created_at.as_deref()),
            record.kind.clone(),
            format_points(record.points_amount),
            record.status.clone(),
            destination.to_string(),
        ]);
    }
    println!("{}", table);
}

pub(super) fn print_transfers(records: &[TransferRecord], me: Option<&str>) {
    if records.is_empty() {
        println!("No transfers yet.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Direction", "With", "Amount"]);
    for record in records {
        table.add_row(vec![
            format_created(record.created_at.as_deref()),
            record.direction.clone().unwrap_or_else(|| "-".to_string()),
            record.counterparty(me).unwrap_or("-").to_string(),
            format_points(record.amount),
        ]);
    }
    println!("{}", table);
}

pub(super) fn print_surveys(surveys: &[Survey]) {
    if surveys.is_empty() {
        println!("No surveys available.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Title", "Reward", "Status"]);
    for survey in surveys {
        let status = if survey.completed {
            "completed".green().to_string()
        } else {
            "open".to_string()
        };
        table.add_row(vec![
            survey.id.clone(),
            survey.title.clone(),
            format_points(survey.points_reward),
            status,
        ]);
    }
    println!("{}", table);
}

/// Show redemption rates on their own
pub fn rates(json: bool) -> Result<()> {
    let mut app = App::new("rates", json)?;
    match app.spin("Loading rates...", || app.ctx.dashboard.rates()) {
        Ok(rates) if app.json => app.emit(OperationResult::ok(rates)),
        Ok(rates) => {
            print_rates(&rates);
            Ok(())
        }
        Err(e) => app.report(LogEvent::new("rates_failed").with_page("dashboard"), e),
    }
}
