//! User domain model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend user id
///
/// The backend may send numeric or string ids. The original JSON form is
/// kept so a stored user serializes back exactly as it arrived, including
/// floats and integers beyond `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Number(id.into())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

/// The logged-in user as returned by `/auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            full_name: None,
        }
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_round_trips() {
        let user: User = serde_json::from_str(r#"{"id":1,"email":"a@b.com"}"#).unwrap();
        assert_eq!(user.id, UserId::Number(1.into()));
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({"id": 1, "email": "a@b.com"})
        );
    }

    #[test]
    fn test_float_and_large_ids_are_kept() {
        let user: User = serde_json::from_str(r#"{"id":1.0,"email":"a@b.com"}"#).unwrap();
        assert_eq!(user.id.to_string(), "1.0");

        let user: User =
            serde_json::from_str(r#"{"id":18446744073709551615,"email":"a@b.com"}"#).unwrap();
        assert_eq!(user.id.to_string(), "18446744073709551615");
        assert_eq!(
            serde_json::to_value(&user).unwrap()["id"],
            serde_json::json!(u64::MAX)
        );
    }

    #[test]
    fn test_string_id_and_full_name() {
        let user: User =
            serde_json::from_str(r#"{"id":"u-9","email":"x@y.io","full_name":"Ada"}"#).unwrap();
        assert_eq!(user.id.to_string(), "u-9");
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = User::new(3, "z@y.io");
        assert_eq!(user.display_name(), "z@y.io");
        user.full_name = Some("  ".into());
        assert_eq!(user.display_name(), "z@y.io");
    }
}
