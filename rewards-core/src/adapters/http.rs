//! HTTP transport for the rewards backend
//!
//! Sends JSON requests with an optional bearer token and hands the raw
//! status and body back to the ApiClient. No retries.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error, Result, GENERIC_NETWORK_ERROR};
use crate::ports::{ApiRequest, ApiResponse, Method, Transport};

/// Environment variable to override the API base URL
pub const API_URL_ENV: &str = "REWARDS_API_URL";

/// Validate a base URL and strip its trailing slash
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url.trim())
        .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::Config(format!(
            "API URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Blocking reqwest transport
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url`
    ///
    /// With `timeout` unset no explicit request timeout is applied.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rewards-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Network("The request timed out. Please try again.".to_string())
        } else if error.is_connect() {
            Error::Network(format!(
                "Unable to connect to the rewards server at {}",
                self.base_url
            ))
        } else {
            Error::Network(GENERIC_NETWORK_ERROR.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request.endpoint);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .header(ACCEPT, "application/json");

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|_| Error::Network(GENERIC_NETWORK_ERROR.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

/// Best-effort public IP lookup
///
/// Accepts a plain-text address or a JSON object with an `ip` field. Any
/// failure yields `None`; the address is informational only.
pub fn lookup_public_ip(url: &str) -> Option<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .ok()?;
    let response = client.get(url).send().ok()?;
    if !response.status().is_success() {
        return None;
    }
    parse_ip_body(&response.text().ok()?)
}

fn parse_ip_body(body: &str) -> Option<String> {
    let body = body.trim();
    let candidate = match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => map.get("ip")?.as_str()?.to_string(),
        _ => body.to_string(),
    };
    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_backend::MockBackend;
    use serde_json::json;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/v1/").unwrap(),
            "https://api.example.com/v1"
        );
        assert!(normalize_base_url("ftp://example.com").is_err());
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_send_post_with_bearer_and_body() {
        let server = MockBackend::start().unwrap();
        server.route("POST", "/auth/verify-pin", 200, json!({"message": "ok"}));

        let transport = HttpTransport::new(&server.base_url(), None).unwrap();
        let response = transport
            .send(&ApiRequest {
                method: Method::Post,
                endpoint: "/auth/verify-pin".into(),
                body: Some(json!({"pin": "1234"})),
                bearer: Some("tok".into()),
            })
            .unwrap();

        assert_eq!(response.status, 200);
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok"));
        assert_eq!(requests[0].body, Some(json!({"pin": "1234"})));
    }

    #[test]
    fn test_non_2xx_is_still_a_response() {
        let server = MockBackend::start().unwrap();
        server.route("GET", "/dashboard/stats", 500, json!({"error": "boom"}));

        let transport = HttpTransport::new(&server.base_url(), None).unwrap();
        let response = transport
            .send(&ApiRequest {
                method: Method::Get,
                endpoint: "/dashboard/stats".into(),
                body: None,
                bearer: None,
            })
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
        assert!(response.body.contains("boom"));
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport =
            HttpTransport::new(&format!("http://127.0.0.1:{}", port), Some(Duration::from_secs(2)))
                .unwrap();
        let err = transport
            .send(&ApiRequest {
                method: Method::Get,
                endpoint: "/surveys".into(),
                body: None,
                bearer: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_parse_ip_body() {
        assert_eq!(parse_ip_body("203.0.113.7\n"), Some("203.0.113.7".into()));
        assert_eq!(parse_ip_body(r#"{"ip":"2001:db8::1"}"#), Some("2001:db8::1".into()));
        assert_eq!(parse_ip_body("<html>"), None);
    }
}
