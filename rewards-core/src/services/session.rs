//! Session store - typed access to the session storage region
//!
//! Every value is stored as a JSON string under a fixed key. Each flow owns
//! its own key, so a signup draft can never stand in for a reset context
//! and a password-reset context can never satisfy a PIN-reset step.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{OtpPurpose, PendingReset, PendingSignup, User};
use crate::ports::SessionStorage;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const CURRENT_USER_KEY: &str = "current_user";
pub const PIN_VERIFIED_KEY: &str = "pin_verified";
pub const PENDING_SIGNUP_KEY: &str = "pending_signup";
pub const PASSWORD_RESET_KEY: &str = "pending_reset.password_reset";
pub const PIN_RESET_KEY: &str = "pending_reset.pin_reset";

/// Storage key for a reset context
///
/// Signup staging lives in the draft, not here; asking for the signup
/// purpose maps to the draft key so the two can never alias a reset key.
pub fn reset_key(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::PasswordReset => PASSWORD_RESET_KEY,
        OtpPurpose::PinReset => PIN_RESET_KEY,
        OtpPurpose::Signup => PENDING_SIGNUP_KEY,
    }
}

/// Typed session store
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Read and decode a value; corrupt values read as absent
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self
            .storage
            .get(key)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.storage.set(key, &serde_json::to_string(value)?)
    }

    // === Authenticated session ===

    /// Store a freshly issued token and user; the PIN challenge is pending
    pub fn save(&self, token: &str, user: &User) -> Result<()> {
        self.write(ACCESS_TOKEN_KEY, &token)?;
        self.write(CURRENT_USER_KEY, user)?;
        self.write(PIN_VERIFIED_KEY, &false)
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .read::<String>(ACCESS_TOKEN_KEY)?
            .filter(|t| !t.is_empty()))
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        self.read(CURRENT_USER_KEY)
    }

    pub fn mark_pin_verified(&self) -> Result<()> {
        self.write(PIN_VERIFIED_KEY, &true)
    }

    pub fn is_pin_verified(&self) -> Result<bool> {
        Ok(self.read::<bool>(PIN_VERIFIED_KEY)?.unwrap_or(false))
    }

    /// Token present and second factor passed
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some() && self.is_pin_verified()?)
    }

    /// Drop the authenticated session but keep any flow staging data
    pub fn end_session(&self) -> Result<()> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(CURRENT_USER_KEY)?;
        self.storage.remove(PIN_VERIFIED_KEY)
    }

    /// Remove every key in the session region
    pub fn clear(&self) -> Result<()> {
        self.storage.clear()
    }

    // === Signup draft ===

    pub fn pending_signup(&self) -> Result<Option<PendingSignup>> {
        self.read(PENDING_SIGNUP_KEY)
    }

    pub fn save_pending_signup(&self, draft: &PendingSignup) -> Result<()> {
        self.write(PENDING_SIGNUP_KEY, draft)
    }

    pub fn clear_pending_signup(&self) -> Result<()> {
        self.storage.remove(PENDING_SIGNUP_KEY)
    }

    // === Reset contexts ===

    /// Reset context for `purpose`
    ///
    /// A stored context whose purpose tag disagrees with its key is ignored.
    pub fn pending_reset(&self, purpose: OtpPurpose) -> Result<Option<PendingReset>> {
        if purpose == OtpPurpose::Signup {
            return Ok(None);
        }
        Ok(self
            .read::<PendingReset>(reset_key(purpose))?
            .filter(|ctx| ctx.purpose == purpose))
    }

    pub fn save_pending_reset(&self, context: &PendingReset) -> Result<()> {
        if context.purpose == OtpPurpose::Signup {
            return Err(Error::storage(
                "Signup staging is stored as a draft, not a reset context",
            ));
        }
        self.write(reset_key(context.purpose), context)
    }

    pub fn clear_pending_reset(&self, purpose: OtpPurpose) -> Result<()> {
        if purpose == OtpPurpose::Signup {
            return Ok(());
        }
        self.storage.remove(reset_key(purpose))
    }

    /// Keys currently held, for diagnostics
    pub fn keys(&self) -> Result<Vec<String>> {
        self.storage.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemorySessionStorage;
    use crate::domain::{DeviceMetadata, ResetStage, SignupStage};

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemorySessionStorage::new()))
    }

    #[test]
    fn test_save_reports_token_and_user() {
        let store = store();
        let user = User::new(1, "a@b.com");
        store.save("t", &user).unwrap();

        assert_eq!(store.token().unwrap(), Some("t".into()));
        assert_eq!(store.current_user().unwrap(), Some(user));
        assert!(!store.is_pin_verified().unwrap());
        assert!(!store.is_authenticated().unwrap());

        store.mark_pin_verified().unwrap();
        assert!(store.is_authenticated().unwrap());
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = store();
        store.save("t", &User::new(1, "a@b.com")).unwrap();
        store
            .save_pending_reset(&PendingReset::new("a@b.com", OtpPurpose::PinReset))
            .unwrap();

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn test_end_session_keeps_flow_data() {
        let store = store();
        store.save("t", &User::new(1, "a@b.com")).unwrap();
        store
            .save_pending_reset(&PendingReset::new("a@b.com", OtpPurpose::PasswordReset))
            .unwrap();

        store.end_session().unwrap();
        assert_eq!(store.token().unwrap(), None);
        assert!(store.pending_reset(OtpPurpose::PasswordReset).unwrap().is_some());
    }

    #[test]
    fn test_reset_contexts_are_isolated() {
        let store = store();
        let mut ctx = PendingReset::new("a@b.com", OtpPurpose::PasswordReset);
        ctx.stage = ResetStage::OtpVerified;
        store.save_pending_reset(&ctx).unwrap();

        assert!(store.pending_reset(OtpPurpose::PinReset).unwrap().is_none());
        assert!(store.pending_reset(OtpPurpose::Signup).unwrap().is_none());
        assert_eq!(store.pending_reset(OtpPurpose::PasswordReset).unwrap(), Some(ctx));
    }

    #[test]
    fn test_mislabelled_reset_context_is_ignored() {
        let storage = Arc::new(MemorySessionStorage::new());
        let ctx = PendingReset::new("a@b.com", OtpPurpose::PasswordReset);
        storage
            .set(PIN_RESET_KEY, &serde_json::to_string(&ctx).unwrap())
            .unwrap();

        let store = SessionStore::new(storage);
        assert!(store.pending_reset(OtpPurpose::PinReset).unwrap().is_none());
    }

    #[test]
    fn test_signup_purpose_cannot_be_saved_as_reset() {
        let store = store();
        let ctx = PendingReset::new("a@b.com", OtpPurpose::Signup);
        assert!(store.save_pending_reset(&ctx).is_err());
    }

    #[test]
    fn test_pending_signup_round_trip() {
        let store = store();
        let draft = PendingSignup {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
            pin: None,
            referral_code: Some("REF".into()),
            device: DeviceMetadata {
                device_fingerprint: "fp".into(),
                ip_address: "unknown".into(),
                user_agent: "ua".into(),
            },
            stage: SignupStage::OtpRequested,
        };
        store.save_pending_signup(&draft).unwrap();
        assert_eq!(store.pending_signup().unwrap(), Some(draft));

        store.clear_pending_signup().unwrap();
        assert!(store.pending_signup().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set(CURRENT_USER_KEY, "{broken").unwrap();
        let store = SessionStore::new(storage);
        assert!(store.current_user().unwrap().is_none());
    }
}
