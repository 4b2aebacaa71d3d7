//! Persisted row types
//!
//! Timestamps are unix milliseconds so that a session renewal within the
//! same second still strictly advances `expires`.

/// A registered user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    /// Unique login name.
    pub name: String,
    /// Encoded as `"$<salt>$<hex digest>"`.
    pub password_hash: String,
    pub last_login: Option<i64>,
}

/// An issued session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,
    /// Opaque token handed to the client at login.
    pub token: String,
    /// Moment after which the session is invalid; slid forward on use.
    pub expires: i64,
}
