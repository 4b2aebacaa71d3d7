//! Persistence boundary
//!
//! The users and sessions tables are owned by an external storage engine;
//! this trait captures exactly the operations the core needs from it.
//! `SqliteDb` is the durable implementation, `MemoryDb` the in-process one
//! used by tests.

pub mod memory;
pub mod records;
pub mod sqlite;

pub use memory::MemoryDb;
pub use records::{SessionRecord, UserRecord};
pub use sqlite::SqliteDb;

use crate::error::DbError;

/// Operations the core requires from the user/session store.
pub trait Database: Send + Sync {
    fn find_user_by_name(&self, name: &str) -> Result<Option<UserRecord>, DbError>;

    /// Insert a new user; fails if `name` is already taken.
    fn insert_user(&self, name: &str, password_hash: &str) -> Result<i64, DbError>;

    fn touch_last_login(&self, user_id: i64, when: i64) -> Result<(), DbError>;

    fn insert_session(&self, user_id: i64, token: &str, expires: i64) -> Result<(), DbError>;

    fn find_session_by_token(&self, token: &str) -> Result<Option<SessionRecord>, DbError>;

    fn slide_session_expiry(&self, session_id: i64, expires: i64) -> Result<(), DbError>;

    fn delete_session(&self, session_id: i64) -> Result<(), DbError>;
}
