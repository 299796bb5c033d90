//! Dashboard service - balances, history and point actions
//!
//! `load` reads the five dashboard widgets on scoped threads and joins them
//! before returning. Each widget settles on its own; a failed read shows up
//! as `Widget::Failed` next to the ones that did load. A rejected token is
//! the exception: it fails the whole load so the caller can send the user
//! to login.

use std::thread::{self, ScopedJoinHandle};

use serde::Serialize;

use crate::domain::result::{Error, Result, GENERIC_NETWORK_ERROR};
use crate::domain::{
    DashboardStats, RedemptionRate, RedemptionRecord, RedemptionRequest, Survey, TransferRecord,
    TransferRequest, User,
};
use crate::services::api::{response_message, ApiClient};
use crate::services::router::{Page, Router};

/// One independently loaded part of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Widget<T> {
    Loaded(T),
    Failed(String),
}

impl<T> Widget<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Widget::Loaded(value) => Some(value),
            Widget::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Widget::Loaded(_) => None,
            Widget::Failed(message) => Some(message),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Widget::Loaded(_))
    }
}

impl<T> From<Result<T>> for Widget<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Widget::Loaded(value),
            Err(e) => Widget::Failed(e.to_string()),
        }
    }
}

fn settle<T>(handle: ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(Error::Network(GENERIC_NETWORK_ERROR.to_string())))
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub user: Option<User>,
    pub stats: Widget<DashboardStats>,
    pub rates: Widget<Vec<RedemptionRate>>,
    pub redemptions: Widget<Vec<RedemptionRecord>>,
    pub transfers: Widget<Vec<TransferRecord>>,
    pub surveys: Widget<Vec<Survey>>,
}

impl DashboardSnapshot {
    /// Messages of the widgets that failed, labelled
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            ("stats", self.stats.error()),
            ("rates", self.rates.error()),
            ("redemptions", self.redemptions.error()),
            ("transfers", self.transfers.error()),
            ("surveys", self.surveys.error()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|e| (name, e)))
        .collect()
    }
}

/// Result of a point action plus the widgets refreshed after it
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    pub stats: Widget<DashboardStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemptions: Option<Widget<Vec<RedemptionRecord>>>,
}

#[derive(Clone)]
pub struct DashboardService {
    api: ApiClient,
    router: Router,
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            router: Router::new(api.session().clone()),
            api,
        }
    }

    /// Load every widget concurrently
    pub fn load(&self) -> Result<DashboardSnapshot> {
        self.router.enter(Page::Dashboard)?;
        let user = self.api.session().current_user()?;
        let api = &self.api;

        let (stats, rates, redemptions, transfers, surveys) = thread::scope(|s| {
            let stats = s.spawn(|| api.stats());
            let rates = s.spawn(|| api.rates());
            let redemptions = s.spawn(|| api.redemption_history());
            let transfers = s.spawn(|| api.points_history());
            let surveys = s.spawn(|| api.surveys());
            (
                settle(stats),
                settle(rates),
                settle(redemptions),
                settle(transfers),
                settle(surveys),
            )
        });

        let unauthorized = [
            stats.as_ref().err(),
            rates.as_ref().err(),
            redemptions.as_ref().err(),
            transfers.as_ref().err(),
            surveys.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .find(|e| e.is_unauthorized())
        .map(|e| e.to_string());
        if let Some(message) = unauthorized {
            return Err(Error::Api {
                status: 401,
                message,
            });
        }

        Ok(DashboardSnapshot {
            user,
            stats: stats.into(),
            rates: rates.into(),
            redemptions: redemptions.into(),
            transfers: transfers.into(),
            surveys: surveys.into(),
        })
    }

    pub fn stats(&self) -> Result<DashboardStats> {
        self.router.enter(Page::Dashboard)?;
        self.api.stats()
    }

    pub fn rates(&self) -> Result<Vec<RedemptionRate>> {
        self.router.enter(Page::Dashboard)?;
        self.api.rates()
    }

    pub fn redemption_history(&self) -> Result<Vec<RedemptionRecord>> {
        self.router.enter(Page::Dashboard)?;
        self.api.redemption_history()
    }

    pub fn transfer_history(&self) -> Result<Vec<TransferRecord>> {
        self.router.enter(Page::Dashboard)?;
        self.api.points_history()
    }

    pub fn surveys(&self) -> Result<Vec<Survey>> {
        self.router.enter(Page::Dashboard)?;
        self.api.surveys()
    }

    /// Send points to another user, then refresh the balance
    pub fn transfer(&self, to_email: &str, amount: i64) -> Result<ActionOutcome> {
        let request = TransferRequest {
            to_email: to_email.to_string(),
            amount,
        };
        request.to_body()?;
        self.router.enter(Page::Dashboard)?;

        let response = self.api.transfer(&request)?;
        let message = response_message(&response).unwrap_or_else(|| {
            format!("Transferred {} points to {}", amount, to_email.trim())
        });

        Ok(ActionOutcome {
            message,
            stats: self.api.stats().into(),
            redemptions: None,
        })
    }

    /// Submit a redemption, then refresh the balance and redemption history
    pub fn request_redemption(&self, request: &RedemptionRequest) -> Result<ActionOutcome> {
        request.to_body()?;
        self.router.enter(Page::Dashboard)?;

        let response = self.api.request_redemption(request)?;
        let message = response_message(&response).unwrap_or_else(|| {
            format!(
                "Redemption of {} points submitted",
                request.points_amount
            )
        });

        Ok(ActionOutcome {
            message,
            stats: self.api.stats().into(),
            redemptions: Some(self.api.redemption_history().into()),
        })
    }

    /// Mark a survey complete, then refresh the balance
    pub fn complete_survey(&self, survey_id: &str) -> Result<ActionOutcome> {
        self.router.enter(Page::Dashboard)?;

        let response = self.api.complete_survey(survey_id)?;
        let message =
            response_message(&response).unwrap_or_else(|| "Survey completed".to_string());

        Ok(ActionOutcome {
            message,
            stats: self.api.stats().into(),
            redemptions: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_from_result() {
        let ok: Widget<i32> = Ok(3).into();
        assert_eq!(ok.loaded(), Some(&3));

        let failed: Widget<i32> = Err(Error::Network("down".into())).into();
        assert_eq!(failed.error(), Some("down"));
        assert!(!failed.is_loaded());
    }

    #[test]
    fn test_widget_serializes_with_status() {
        let ok: Widget<i32> = Widget::Loaded(5);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"status": "loaded", "data": 5})
        );
        let failed: Widget<i32> = Widget::Failed("x".into());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"status": "failed", "data": "x"})
        );
    }
}
