//! API client - request construction and response interpretation
//!
//! Every backend call goes through `ApiClient::call`. Authenticated calls
//! fail locally with `Error::NotAuthenticated` when the session holds no
//! token; nothing is sent in that case.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::domain::result::{Error, Result, GENERIC_NETWORK_ERROR};
use crate::domain::rewards::{extract_list, parse_rates};
use crate::domain::{
    DashboardStats, OtpPurpose, RedemptionRate, RedemptionRecord, RedemptionRequest, Survey,
    TransferRecord, TransferRequest, User,
};
use crate::ports::{ApiRequest, ApiResponse, Method, Transport};
use crate::services::session::SessionStore;

/// Body of a successful `/auth/login`
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: User,
}

/// Backend API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Send one request and decode its JSON body
    ///
    /// A 2xx response with an empty body decodes as `null`. Any other
    /// status becomes `Error::Api` with the backend's message. A 401 on an
    /// authenticated call ends the session, so the user lands on login.
    pub fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<JsonValue>,
        requires_auth: bool,
    ) -> Result<JsonValue> {
        let bearer = if requires_auth {
            Some(self.session.token()?.ok_or(Error::NotAuthenticated)?)
        } else {
            None
        };

        let request = ApiRequest {
            method,
            endpoint: endpoint.to_string(),
            body,
            bearer,
        };

        let response = self.transport.send(&request)?;
        match decode_response(&response) {
            Err(e) if requires_auth && e.is_unauthorized() => {
                self.session.end_session()?;
                Err(e)
            }
            other => other,
        }
    }

    fn get(&self, endpoint: &str) -> Result<JsonValue> {
        self.call(endpoint, Method::Get, None, true)
    }

    fn post(&self, endpoint: &str, body: JsonValue, requires_auth: bool) -> Result<JsonValue> {
        self.call(endpoint, Method::Post, Some(body), requires_auth)
    }

    // === Auth ===

    pub fn request_otp(&self, email: &str, purpose: OtpPurpose) -> Result<JsonValue> {
        self.post(
            "/auth/request-otp",
            json!({ "email": email, "purpose": purpose }),
            false,
        )
    }

    pub fn verify_otp(&self, email: &str, otp_code: &str, purpose: OtpPurpose) -> Result<JsonValue> {
        self.post(
            "/auth/verify-otp",
            json!({ "email": email, "otp_code": otp_code, "purpose": purpose }),
            false,
        )
    }

    pub fn signup(&self, registration: JsonValue) -> Result<JsonValue> {
        self.post("/auth/signup", registration, false)
    }

    /// Exchange credentials for an access token and the user record
    pub fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let value = self.post(
            "/auth/login",
            json!({ "email": email, "password": password }),
            false,
        )?;
        let response: LoginResponse = serde_json::from_value(value).map_err(|_| {
            Error::Network("Unexpected login response from server".to_string())
        })?;
        if response.access_token.is_empty() {
            return Err(Error::Network(
                "Login response did not include an access token".to_string(),
            ));
        }
        Ok((response.access_token, response.user))
    }

    pub fn verify_pin(&self, pin: &str) -> Result<JsonValue> {
        self.post("/auth/verify-pin", json!({ "pin": pin }), true)
    }

    pub fn reset_password(&self, email: &str, new_password: &str) -> Result<JsonValue> {
        self.post(
            "/auth/reset-password",
            json!({ "email": email, "new_password": new_password }),
            false,
        )
    }

    pub fn reset_pin(&self, email: &str, new_pin: &str) -> Result<JsonValue> {
        self.post(
            "/auth/reset-pin",
            json!({ "email": email, "new_pin": new_pin }),
            false,
        )
    }

    // === Dashboard ===

    pub fn stats(&self) -> Result<DashboardStats> {
        let value = self.get("/dashboard/stats")?;
        let value = match value {
            JsonValue::Object(mut map) if map.contains_key("stats") => {
                map.remove("stats").unwrap_or(JsonValue::Null)
            }
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    pub fn points_history(&self) -> Result<Vec<TransferRecord>> {
        extract_list(self.get("/points/history")?, "history")
    }

    pub fn transfer(&self, request: &TransferRequest) -> Result<JsonValue> {
        self.post("/points/transfer", request.to_body()?, true)
    }

    pub fn rates(&self) -> Result<Vec<RedemptionRate>> {
        parse_rates(self.get("/redemption/rates")?)
    }

    pub fn redemption_history(&self) -> Result<Vec<RedemptionRecord>> {
        extract_list(self.get("/redemption/history")?, "history")
    }

    pub fn request_redemption(&self, request: &RedemptionRequest) -> Result<JsonValue> {
        self.post("/redemption/request", request.to_body()?, true)
    }

    pub fn surveys(&self) -> Result<Vec<Survey>> {
        extract_list(self.get("/surveys")?, "surveys")
    }

    pub fn complete_survey(&self, survey_id: &str) -> Result<JsonValue> {
        let survey_id = survey_id.trim();
        if survey_id.is_empty() {
            return Err(Error::validation("Survey id is required"));
        }
        self.post(
            &format!("/surveys/{}/complete", survey_id),
            json!({}),
            true,
        )
    }
}

/// Interpret a raw response
pub fn decode_response(response: &ApiResponse) -> Result<JsonValue> {
    let text = response.body.trim();
    let parsed = if text.is_empty() {
        None
    } else {
        serde_json::from_str::<JsonValue>(text).ok()
    };

    if response.is_success() {
        return match parsed {
            Some(value) => Ok(value),
            None if text.is_empty() => Ok(JsonValue::Null),
            None => Err(Error::Network(GENERIC_NETWORK_ERROR.to_string())),
        };
    }

    Err(Error::Api {
        status: response.status,
        message: error_message(parsed.as_ref()),
    })
}

/// The `message` field of a success body, if any
pub fn response_message(value: &JsonValue) -> Option<String> {
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Backend message from an error body: `error`, then `detail`, then `message`
fn error_message(body: Option<&JsonValue>) -> String {
    let Some(body) = body else {
        return GENERIC_NETWORK_ERROR.to_string();
    };
    for key in ["error", "detail", "message"] {
        match body.get(key) {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => return s.clone(),
            // Validation errors arrive as a list of {loc, msg}
            Some(JsonValue::Array(items)) => {
                if let Some(msg) = items
                    .iter()
                    .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
                {
                    return msg.to_string();
                }
            }
            _ => {}
        }
    }
    GENERIC_NETWORK_ERROR.to_string()
}
