//! Credential storage and verification
//!
//! Password hashes are stored as `"$<salt>$<hex digest>"` where the digest
//! is SHA-256 over `password + salt` and the salt is a fresh random token
//! per registration, so two users never share one.

use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::DbError;

/// Verifies plaintext passwords against salted hashes in the user store.
#[derive(Clone)]
pub struct CredentialVault {
    db: Arc<dyn Database>,
}

/// Hex digest of `password + salt`.
fn digest_hex(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

fn encode_hash(password: &str, salt: &str) -> String {
    format!("${salt}${}", digest_hex(password, salt))
}

/// Compare two digests without short-circuiting on the first mismatch.
fn digests_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl CredentialVault {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Register a new user. Returns `false` if the name is already taken.
    pub fn register(&self, username: &str, password: &str) -> Result<bool, DbError> {
        if self.db.find_user_by_name(username)?.is_some() {
            debug!("Registration rejected, user {} already exists", username);
            return Ok(false);
        }

        let salt = Uuid::new_v4().simple().to_string();
        self.db.insert_user(username, &encode_hash(password, &salt))?;
        debug!("Registered user {}", username);
        Ok(true)
    }

    /// Check `password` against the stored salted hash for `username`.
    ///
    /// Absent users and malformed stored hashes both verify as `false`;
    /// the digest is always recomputed from the stored salt, so a hash
    /// whose salt segment was altered can never be accepted.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, DbError> {
        let Some(user) = self.db.find_user_by_name(username)? else {
            debug!("Verification failed, user {} not found", username);
            return Ok(false);
        };

        let mut segments = user.password_hash.splitn(3, '$');
        let (Some(""), Some(salt), Some(stored_digest)) =
            (segments.next(), segments.next(), segments.next())
        else {
            warn!("Malformed password hash for user {}", username);
            return Ok(false);
        };

        Ok(digests_match(&digest_hex(password, salt), stored_digest))
    }
}
