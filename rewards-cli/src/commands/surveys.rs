//! Survey commands - list surveys and mark them complete

use anyhow::Result;
use clap::Subcommand;
use rewards_core::{LogEvent, OperationResult, ToastKind};

use super::dashboard::{print_stats, print_surveys};
use super::App;

#[derive(Subcommand)]
pub enum SurveyCommands {
    /// Show active surveys
    List,
    /// Mark a survey as completed and collect its points
    Complete {
        /// Survey ID
        id: String,
    },
}

pub fn run(command: SurveyCommands, json: bool) -> Result<()> {
    match command {
        SurveyCommands::List => {
            let mut app = App::new("surveys list", json)?;
            match app.spin("Loading surveys...", || app.ctx.dashboard.surveys()) {
                Ok(surveys) if app.json => app.emit(OperationResult::ok(surveys)),
                Ok(surveys) => {
                    print_surveys(&surveys);
                    Ok(())
                }
                Err(e) => app.report(LogEvent::new("surveys_failed").with_page("dashboard"), e),
            }
        }
        SurveyCommands::Complete { id } => {
            let mut app = App::new("surveys complete", json)?;
            let result = app.spin("Submitting survey...", || {
                app.ctx.dashboard.complete_survey(&id)
            });
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    return app.report(
                        LogEvent::new("survey_complete_failed").with_page("dashboard"),
                        e,
                    )
                }
            };

            app.log(LogEvent::new("survey_completed").with_page("dashboard"));
            app.toast(ToastKind::Success, outcome.message.clone());
            if app.json {
                return app.emit(OperationResult::ok(outcome));
            }
            match outcome.stats.loaded() {
                Some(stats) => print_stats(stats),
                None => app.toast(ToastKind::Warning, "Could not refresh balance"),
            }
            Ok(())
        }
    }
}
