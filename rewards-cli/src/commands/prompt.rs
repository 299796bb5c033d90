//! Terminal prompts for values not given on the command line

use std::env;

use anyhow::Result;
use dialoguer::{Input, Password};

/// Environment variable read instead of prompting for a password
pub const PASSWORD_ENV: &str = "REWARDS_PASSWORD";
/// Environment variable read instead of prompting for a PIN
pub const PIN_ENV: &str = "REWARDS_PIN";

/// Use `preset` when given, otherwise ask
pub fn text(preset: Option<String>, prompt: &str) -> Result<String> {
    match preset {
        Some(value) => Ok(value),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

/// Like [`text`], but an empty answer gives `None`
pub fn optional_text(preset: Option<String>, prompt: &str) -> Result<Option<String>> {
    let value = match preset {
        Some(value) => value,
        None => Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?,
    };
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Read a secret from `env_var`, or prompt with hidden input
pub fn secret(env_var: &str, prompt: &str) -> Result<String> {
    if let Ok(value) = env::var(env_var) {
        return Ok(value);
    }
    Ok(Password::new().with_prompt(prompt).allow_empty_password(true).interact()?)
}

/// Read a secret and its confirmation
///
/// Both are returned as typed so a mismatch is reported by the flow.
pub fn secret_confirmed(env_var: &str, prompt: &str, confirm: &str) -> Result<(String, String)> {
    if let Ok(value) = env::var(env_var) {
        return Ok((value.clone(), value));
    }
    let first = Password::new().with_prompt(prompt).allow_empty_password(true).interact()?;
    let second = Password::new().with_prompt(confirm).allow_empty_password(true).interact()?;
    Ok((first, second))
}
