//! In-memory store
//!
//! Backs tests and single-process deployments that do not need durability.

use std::sync::{Mutex, MutexGuard};

use crate::db::Database;
use crate::db::records::{SessionRecord, UserRecord};
use crate::error::DbError;

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    sessions: Vec<SessionRecord>,
    next_user_id: i64,
    next_session_id: i64,
}

/// Mutex-guarded tables mirroring the sqlite schema.
#[derive(Default)]
pub struct MemoryDb {
    inner: Mutex<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of live session rows. Test-facing observability only.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }
}

impl Database for MemoryDb {
    fn find_user_by_name(&self, name: &str) -> Result<Option<UserRecord>, DbError> {
        Ok(self.lock().users.iter().find(|u| u.name == name).cloned())
    }

    fn insert_user(&self, name: &str, password_hash: &str) -> Result<i64, DbError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.name == name) {
            return Err(DbError::Constraint(format!("user name taken: {name}")));
        }
        tables.next_user_id += 1;
        let id = tables.next_user_id;
        tables.users.push(UserRecord {
            id,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            last_login: None,
        });
        Ok(id)
    }

    fn touch_last_login(&self, user_id: i64, when: i64) -> Result<(), DbError> {
        let mut tables = self.lock();
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.last_login = Some(when);
                Ok(())
            }
            None => Err(DbError::Constraint(format!("no such user: {user_id}"))),
        }
    }

    fn insert_session(&self, user_id: i64, token: &str, expires: i64) -> Result<(), DbError> {
        let mut tables = self.lock();
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(DbError::Constraint(format!("no such user: {user_id}")));
        }
        tables.next_session_id += 1;
        let id = tables.next_session_id;
        tables.sessions.push(SessionRecord {
            id,
            user_id,
            token: token.to_string(),
            expires,
        });
        Ok(())
    }

    fn find_session_by_token(&self, token: &str) -> Result<Option<SessionRecord>, DbError> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .find(|s| s.token == token)
            .cloned())
    }

    fn slide_session_expiry(&self, session_id: i64, expires: i64) -> Result<(), DbError> {
        let mut tables = self.lock();
        match tables.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                session.expires = expires;
                Ok(())
            }
            None => Err(DbError::Constraint(format!("no such session: {session_id}"))),
        }
    }

    fn delete_session(&self, session_id: i64) -> Result<(), DbError> {
        self.lock().sessions.retain(|s| s.id != session_id);
        Ok(())
    }
}
