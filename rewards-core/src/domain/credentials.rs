//! Local input validation
//!
//! Everything here runs before a request is built. A failure is always an
//! `Error::Validation` and never touches the network.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::result::{Error, Result};

/// Number of digits in a PIN
pub const PIN_LENGTH: usize = 4;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// Trim and lowercase an email, then check its shape
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::validation("Email is required"));
    }
    if !email_regex().is_match(&email) {
        return Err(Error::validation("Please enter a valid email address"));
    }
    Ok(email)
}

/// A PIN is exactly four ASCII digits
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation("PIN must be exactly 4 digits"));
    }
    Ok(())
}

/// Check a PIN and its confirmation
pub fn validate_pin_pair(pin: &str, confirm: &str) -> Result<()> {
    validate_pin(pin)?;
    if pin != confirm {
        return Err(Error::validation("PINs do not match"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("Password is required"));
    }
    Ok(())
}

/// Check a password and its confirmation
pub fn validate_password_pair(password: &str, confirm: &str) -> Result<()> {
    validate_password(password)?;
    if password != confirm {
        return Err(Error::validation("Passwords do not match"));
    }
    Ok(())
}

/// OTP codes are non-empty digit strings; surrounding whitespace is dropped
pub fn normalize_otp(code: &str) -> Result<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::validation("Verification code is required"));
    }
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation("Verification code must contain only digits"));
    }
    Ok(code.to_string())
}

pub fn require_non_empty(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_must_be_four_digits() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("0000").is_ok());
        for bad in ["", "123", "12345", "12a4", " 123", "１２３４", "12.4"] {
            let err = validate_pin(bad).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_pin_confirmation_mismatch() {
        let err = validate_pin_pair("1234", "4321").unwrap_err();
        assert_eq!(err.to_string(), "PINs do not match");
    }

    #[test]
    fn test_pin_format_checked_before_match() {
        let err = validate_pin_pair("12", "12").unwrap_err();
        assert_eq!(err.to_string(), "PIN must be exactly 4 digits");
    }

    #[test]
    fn test_password_confirmation() {
        assert!(validate_password_pair("hunter2", "hunter2").is_ok());
        assert!(validate_password_pair("hunter2", "hunter3").is_err());
        assert!(validate_password_pair("", "").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(normalize_email("").is_err());
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("a@b").is_err());
    }

    #[test]
    fn test_normalize_otp() {
        assert_eq!(normalize_otp(" 123456\n").unwrap(), "123456");
        assert!(normalize_otp("").is_err());
        assert!(normalize_otp("12ab").is_err());
    }
}
