//! Points, redemption, transfer and survey records
//!
//! The backend owns these records; the client only displays them. Parsing
//! is lenient: numbers may arrive as strings, ids as numbers or strings, and
//! fields the client does not know about are kept in `extra`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::credentials::normalize_email;
use crate::domain::result::{Error, Result};

// =============================================================================
// Lenient field decoders
// =============================================================================

/// Deserialize ID that can be number or string
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected number or string for id")),
    }
}

fn points_from_value(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Deserialize a point count that can be integer, float or string
fn deserialize_points<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    points_from_value(&value).ok_or_else(|| D::Error::custom("expected number or string for points"))
}

/// Deserialize an optional point count; null reads as None
fn deserialize_optional_points<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => points_from_value(&v)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected number or string for points")),
    }
}

fn decimal_from_value(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => n.to_string().parse::<Decimal>().ok().or_else(|| {
            n.as_f64().and_then(|f| Decimal::try_from(f).ok())
        }),
        JsonValue::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Deserialize a rate that can be number or string
fn deserialize_decimal<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    decimal_from_value(&value).ok_or_else(|| D::Error::custom("expected number or string for rate"))
}

/// Pull a list out of a response that is either a bare array or an object
/// wrapping the array under `key`
///
/// Objects without `key` fall back to their only array-valued field. A null
/// body reads as an empty list. Entries that do not decode are skipped.
pub fn extract_list<T: DeserializeOwned>(value: JsonValue, key: &str) -> Result<Vec<T>> {
    let items = match value {
        JsonValue::Null => return Ok(Vec::new()),
        JsonValue::Array(_) => value,
        JsonValue::Object(mut map) => match map.remove(key) {
            Some(inner) => inner,
            None => {
                let mut arrays = map.into_iter().filter(|(_, v)| v.is_array());
                match (arrays.next(), arrays.next()) {
                    (Some((_, inner)), None) => inner,
                    _ => {
                        return Err(Error::Network(format!(
                            "Unexpected response: no '{}' list found",
                            key
                        )))
                    }
                }
            }
        },
        _ => {
            return Err(Error::Network(format!(
                "Unexpected response: expected a '{}' list",
                key
            )))
        }
    };
    match items {
        JsonValue::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()),
        JsonValue::Null => Ok(Vec::new()),
        _ => Err(Error::Network(format!(
            "Unexpected response: '{}' is not a list",
            key
        ))),
    }
}

// =============================================================================
// Records
// =============================================================================

/// Balance summary from `/dashboard/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "deserialize_points")]
    pub total_points: i64,
    #[serde(default, deserialize_with = "deserialize_optional_points", skip_serializing_if = "Option::is_none")]
    pub available_points: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_points", skip_serializing_if = "Option::is_none")]
    pub pending_points: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_points", skip_serializing_if = "Option::is_none")]
    pub lifetime_earned: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_points", skip_serializing_if = "Option::is_none")]
    pub lifetime_redeemed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_points", skip_serializing_if = "Option::is_none")]
    pub surveys_completed: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

impl DashboardStats {
    /// Points the user can spend right now
    pub fn spendable(&self) -> i64 {
        self.available_points.unwrap_or(self.total_points)
    }
}

/// Conversion rate for one redemption type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionRate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_points", skip_serializing_if = "Option::is_none")]
    pub min_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parse `/redemption/rates`
///
/// Accepts a list of rate objects (bare or wrapped under `rates`) or a map
/// from type name to either a bare number or a rate object without `type`.
pub fn parse_rates(value: JsonValue) -> Result<Vec<RedemptionRate>> {
    let value = match value {
        JsonValue::Object(mut map) if map.contains_key("rates") => {
            map.remove("rates").unwrap_or(JsonValue::Null)
        }
        other => other,
    };

    match value {
        JsonValue::Object(map) => {
            let mut rates = Vec::with_capacity(map.len());
            for (kind, entry) in map {
                let rate = match entry {
                    JsonValue::Object(mut fields) => {
                        fields.insert("type".into(), JsonValue::String(kind));
                        serde_json::from_value(JsonValue::Object(fields))?
                    }
                    scalar => RedemptionRate {
                        rate: decimal_from_value(&scalar).ok_or_else(|| {
                            Error::Network(format!("Unexpected rate value for '{}'", kind))
                        })?,
                        kind,
                        min_points: None,
                        description: None,
                    },
                };
                rates.push(rate);
            }
            rates.sort_by(|a, b| a.kind.cmp(&b.kind));
            Ok(rates)
        }
        other => extract_list(other, "rates"),
    }
}

/// One entry from `/redemption/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "deserialize_points")]
    pub points_amount: i64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

fn default_status() -> String {
    "pending".to_string()
}

/// One entry from `/points/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
    #[serde(deserialize_with = "deserialize_points")]
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

impl TransferRecord {
    /// The other party, as seen from `me`
    pub fn counterparty(&self, me: Option<&str>) -> Option<&str> {
        match (self.from_email.as_deref(), self.to_email.as_deref()) {
            (Some(from), Some(to)) => match me {
                Some(me) if from.eq_ignore_ascii_case(me) => Some(to),
                Some(_) => Some(from),
                None => Some(to),
            },
            (from, to) => to.or(from),
        }
    }
}

/// An active survey from `/surveys`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_points")]
    pub points_reward: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

// =============================================================================
// Requests
// =============================================================================

/// Redemption payout type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionKind {
    Bitcoin,
    GiftCard,
}

impl RedemptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionKind::Bitcoin => "bitcoin",
            RedemptionKind::GiftCard => "gift_card",
        }
    }
}

impl fmt::Display for RedemptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "bitcoin" | "btc" => Ok(RedemptionKind::Bitcoin),
            "gift_card" | "giftcard" => Ok(RedemptionKind::GiftCard),
            other => Err(Error::validation(format!(
                "Unknown redemption type: {}. Available: bitcoin, gift_card",
                other
            ))),
        }
    }
}

/// Body of `POST /redemption/request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    pub kind: RedemptionKind,
    pub points_amount: i64,
    pub wallet_address: Option<String>,
    pub email_address: Option<String>,
}

impl RedemptionRequest {
    /// Check the request and return the JSON body to send
    ///
    /// Bitcoin payouts need a wallet address, gift cards a delivery email.
    pub fn to_body(&self) -> Result<JsonValue> {
        if self.points_amount <= 0 {
            return Err(Error::validation("Points amount must be greater than zero"));
        }

        let mut body = serde_json::json!({
            "type": self.kind.as_str(),
            "points_amount": self.points_amount,
        });

        match self.kind {
            RedemptionKind::Bitcoin => {
                let wallet = self
                    .wallet_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .ok_or_else(|| Error::validation("Wallet address is required for bitcoin"))?;
                body["wallet_address"] = serde_json::json!(wallet);
            }
            RedemptionKind::GiftCard => {
                let email = self
                    .email_address
                    .as_deref()
                    .ok_or_else(|| Error::validation("Email address is required for gift cards"))?;
                body["email_address"] = serde_json::json!(normalize_email(email)?);
            }
        }

        Ok(body)
    }
}

/// Body of `POST /points/transfer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to_email: String,
    pub amount: i64,
}

impl TransferRequest {
    pub fn to_body(&self) -> Result<JsonValue> {
        let to_email = normalize_email(&self.to_email)?;
        if self.amount <= 0 {
            return Err(Error::validation("Amount must be greater than zero"));
        }
        Ok(serde_json::json!({
            "to_email": to_email,
            "amount": self.amount,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_lenient_numbers_and_extra_fields() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_points": "1500",
            "available_points": 1200.0,
            "pending_points": null,
            "referral_code": "ADA42",
            "tier": "gold"
        }))
        .unwrap();

        assert_eq!(stats.total_points, 1500);
        assert_eq!(stats.available_points, Some(1200));
        assert_eq!(stats.pending_points, None);
        assert_eq!(stats.spendable(), 1200);
        assert_eq!(stats.extra["tier"], "gold");
    }

    #[test]
    fn test_stats_missing_total_defaults_to_zero() {
        let stats: DashboardStats = serde_json::from_value(json!({})).unwrap();
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.spendable(), 0);
    }

    #[test]
    fn test_extract_list_bare_and_wrapped() {
        let bare = json!([{"id": 1, "title": "Food habits", "points_reward": 50}]);
        let surveys: Vec<Survey> = extract_list(bare, "surveys").unwrap();
        assert_eq!(surveys[0].id, "1");
        assert!(!surveys[0].completed);

        let wrapped = json!({"surveys": [{"id": "s2", "title": "Travel"}], "total": 1});
        let surveys: Vec<Survey> = extract_list(wrapped, "surveys").unwrap();
        assert_eq!(surveys[0].id, "s2");
        assert_eq!(surveys[0].points_reward, 0);
    }

    #[test]
    fn test_extract_list_single_array_fallback() {
        let body = json!({"items": [{"id": 7, "amount": 25, "to_email": "b@c.io"}], "page": 1});
        let transfers: Vec<TransferRecord> = extract_list(body, "history").unwrap();
        assert_eq!(transfers[0].amount, 25);
    }

    #[test]
    fn test_extract_list_null_is_empty() {
        let items: Vec<Survey> = extract_list(JsonValue::Null, "surveys").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_extract_list_skips_entries_that_do_not_decode() {
        let body = json!({"history": [
            {"id": 1, "type": "bitcoin", "points_amount": 1000, "status": "completed"},
            {"points_amount": 5},
            {"id": 3}
        ]});
        let records: Vec<RedemptionRecord> = extract_list(body, "history").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "bitcoin");
        assert_eq!(records[1].id, "3");
        assert_eq!(records[1].points_amount, 0);
        assert_eq!(records[1].status, "pending");

        let surveys: Vec<Survey> =
            extract_list(json!([{"id": "s1"}, {"title": "no id"}]), "surveys").unwrap();
        assert_eq!(surveys.len(), 1);
        assert_eq!(surveys[0].title, "");
    }

    #[test]
    fn test_extract_list_rejects_wrapped_scalar() {
        assert!(extract_list::<Survey>(json!({"surveys": "none"}), "surveys").is_err());
    }

    #[test]
    fn test_extract_list_rejects_scalar() {
        assert!(extract_list::<Survey>(json!("nope"), "surveys").is_err());
    }

    #[test]
    fn test_parse_rates_list_and_map() {
        let list = json!([{"type": "bitcoin", "rate": "0.00000125", "min_points": 1000}]);
        let rates = parse_rates(list).unwrap();
        assert_eq!(rates[0].kind, "bitcoin");
        assert_eq!(rates[0].rate, "0.00000125".parse::<Decimal>().unwrap());
        assert_eq!(rates[0].min_points, Some(1000));

        let map = json!({"rates": {"gift_card": 0.01, "bitcoin": {"rate": 0.000001, "min_points": 500}}});
        let rates = parse_rates(map).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].kind, "bitcoin");
        assert_eq!(rates[0].min_points, Some(500));
        assert_eq!(rates[1].kind, "gift_card");
        assert_eq!(rates[1].rate, "0.01".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_redemption_defaults_status() {
        let record: RedemptionRecord = serde_json::from_value(json!({
            "id": 3, "type": "gift_card", "points_amount": 500, "email_address": "a@b.com"
        }))
        .unwrap();
        assert_eq!(record.status, "pending");
        assert_eq!(record.kind, "gift_card");
    }

    #[test]
    fn test_transfer_counterparty() {
        let record: TransferRecord = serde_json::from_value(json!({
            "id": 1, "from_email": "me@x.io", "to_email": "you@x.io", "amount": 10
        }))
        .unwrap();
        assert_eq!(record.counterparty(Some("ME@x.io")), Some("you@x.io"));
        assert_eq!(record.counterparty(Some("you@x.io")), Some("me@x.io"));
    }

    #[test]
    fn test_redemption_kind_parse() {
        assert_eq!("BTC".parse::<RedemptionKind>().unwrap(), RedemptionKind::Bitcoin);
        assert_eq!("gift-card".parse::<RedemptionKind>().unwrap(), RedemptionKind::GiftCard);
        assert!("paypal".parse::<RedemptionKind>().is_err());
    }

    #[test]
    fn test_bitcoin_redemption_requires_wallet() {
        let req = RedemptionRequest {
            kind: RedemptionKind::Bitcoin,
            points_amount: 1000,
            wallet_address: Some("  ".into()),
            email_address: None,
        };
        assert!(matches!(req.to_body(), Err(Error::Validation(_))));

        let req = RedemptionRequest {
            wallet_address: Some("bc1qxyz".into()),
            ..req
        };
        let body = req.to_body().unwrap();
        assert_eq!(body["type"], "bitcoin");
        assert_eq!(body["wallet_address"], "bc1qxyz");
        assert!(body.get("email_address").is_none());
    }

    #[test]
    fn test_gift_card_redemption_requires_email() {
        let req = RedemptionRequest {
            kind: RedemptionKind::GiftCard,
            points_amount: 500,
            wallet_address: None,
            email_address: None,
        };
        assert!(req.to_body().is_err());

        let req = RedemptionRequest {
            email_address: Some("Gift@Example.com".into()),
            ..req
        };
        assert_eq!(req.to_body().unwrap()["email_address"], "gift@example.com");
    }

    #[test]
    fn test_redemption_rejects_non_positive_points() {
        let req = RedemptionRequest {
            kind: RedemptionKind::GiftCard,
            points_amount: 0,
            wallet_address: None,
            email_address: Some("a@b.com".into()),
        };
        assert!(req.to_body().is_err());
    }

    #[test]
    fn test_transfer_body() {
        let req = TransferRequest {
            to_email: " Friend@Example.com".into(),
            amount: 50,
        };
        assert_eq!(req.to_body().unwrap(), json!({"to_email": "friend@example.com", "amount": 50}));

        let bad = TransferRequest {
            to_email: "friend@example.com".into(),
            amount: -5,
        };
        assert!(bad.to_body().is_err());
    }
}
