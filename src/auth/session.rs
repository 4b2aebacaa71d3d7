//! Session lifecycle
//!
//! Opaque tokens with sliding expiry. Expired rows are reaped lazily the
//! next time their token is presented; there is no background sweeper, so
//! expiry is enforced only here and consumers must never read `expires`
//! around this module.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::auth::Credentials;
use crate::auth::credentials::CredentialVault;
use crate::db::Database;
use crate::error::AuthError;

/// Current time as unix milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Issues, validates, renews and expires session tokens.
pub struct SessionManager {
    db: Arc<dyn Database>,
    vault: CredentialVault,
    expiry_window: Duration,
    /// Serializes every read-expire-or-slide sequence so no request can
    /// observe a stale `expires` for a token mid-update.
    renew_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(db: Arc<dyn Database>, vault: CredentialVault, expiry_window: Duration) -> Self {
        Self {
            db,
            vault,
            expiry_window,
            renew_lock: Mutex::new(()),
        }
    }

    fn window_millis(&self) -> i64 {
        self.expiry_window.as_millis() as i64
    }

    /// Verify credentials and issue a fresh opaque token.
    ///
    /// Updates the user's last-login timestamp on success. Bad credentials
    /// are `AuthFailed`; no session row is created for them.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !self.vault.verify(username, password)? {
            warn!("Login failed for user {}", username);
            return Err(AuthError::AuthFailed);
        }
        let Some(user) = self.db.find_user_by_name(username)? else {
            // Verified a moment ago but gone now; treat as a plain failure.
            return Err(AuthError::AuthFailed);
        };

        let now = now_millis();
        let token = Uuid::new_v4().to_string();
        self.db
            .insert_session(user.id, &token, now + self.window_millis())?;
        self.db.touch_last_login(user.id, now)?;

        info!("User {} logged in", username);
        Ok(token)
    }

    /// Validate a token or a basic username/password pair.
    ///
    /// Token validation slides the expiry window forward on success and
    /// deletes the row when it is found expired. Basic credentials are
    /// checked against the vault only; minting sessions is `login`'s
    /// exclusive responsibility. Invalid input is a `false` outcome, never
    /// an error.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<bool, AuthError> {
        match credentials {
            Credentials::Token(token) => self.authenticate_token(token),
            Credentials::Basic { username, password } => {
                Ok(self.vault.verify(username, password)?)
            }
        }
    }

    fn authenticate_token(&self, token: &str) -> Result<bool, AuthError> {
        let _guard = self.renew_lock.lock().unwrap_or_else(|e| e.into_inner());

        let Some(session) = self.db.find_session_by_token(token)? else {
            debug!("Unknown session token presented");
            return Ok(false);
        };

        let now = now_millis();
        if session.expires < now {
            self.db.delete_session(session.id)?;
            debug!("Expired session for user {} reaped", session.user_id);
            return Ok(false);
        }

        self.db
            .slide_session_expiry(session.id, now + self.window_millis())?;
        debug!("Session for user {} renewed", session.user_id);
        Ok(true)
    }
}
