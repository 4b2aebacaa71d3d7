//! SQLite-backed store
//!
//! Durable implementation of the persistence boundary. The schema is
//! created on open: users unique by name, sessions keyed by token with a
//! foreign key to the owning user.

use log::info;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::db::Database;
use crate::db::records::{SessionRecord, UserRecord};
use crate::error::DbError;

pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path.as_ref())?;
        Self::init_schema(&conn)?;
        info!("User database at {}", path.as_ref().display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), DbError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                 id            INTEGER PRIMARY KEY AUTOINCREMENT,
                 name          TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL,
                 last_login    INTEGER
             );
             CREATE TABLE IF NOT EXISTS sessions (
                 id      INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_id INTEGER NOT NULL REFERENCES users(id),
                 token   TEXT NOT NULL UNIQUE,
                 expires INTEGER NOT NULL
             );",
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Database for SqliteDb {
    fn find_user_by_name(&self, name: &str) -> Result<Option<UserRecord>, DbError> {
        let conn = self.lock();
        let user = conn
            .query_row(
                "SELECT id, name, password_hash, last_login FROM users WHERE name = ?1",
                params![name],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        password_hash: row.get(2)?,
                        last_login: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn insert_user(&self, name: &str, password_hash: &str) -> Result<i64, DbError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO users (name, password_hash) VALUES (?1, ?2)",
            params![name, password_hash],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn touch_last_login(&self, user_id: i64, when: i64) -> Result<(), DbError> {
        self.lock().execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2",
            params![when, user_id],
        )?;
        Ok(())
    }

    fn insert_session(&self, user_id: i64, token: &str, expires: i64) -> Result<(), DbError> {
        self.lock().execute(
            "INSERT INTO sessions (user_id, token, expires) VALUES (?1, ?2, ?3)",
            params![user_id, token, expires],
        )?;
        Ok(())
    }

    fn find_session_by_token(&self, token: &str) -> Result<Option<SessionRecord>, DbError> {
        let conn = self.lock();
        let session = conn
            .query_row(
                "SELECT id, user_id, token, expires FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(SessionRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        token: row.get(2)?,
                        expires: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    fn slide_session_expiry(&self, session_id: i64, expires: i64) -> Result<(), DbError> {
        self.lock().execute(
            "UPDATE sessions SET expires = ?1 WHERE id = ?2",
            params![expires, session_id],
        )?;
        Ok(())
    }

    fn delete_session(&self, session_id: i64) -> Result<(), DbError> {
        self.lock()
            .execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_db() -> (tempfile::TempDir, SqliteDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteDb::open(dir.path().join("users.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn schema_enforces_unique_user_names() {
        let (_dir, db) = open_temp_db();
        db.insert_user("alice", "$s$h").unwrap();
        assert!(db.insert_user("alice", "$s$h").is_err());
    }

    #[test]
    fn user_and_session_rows_round_trip() {
        let (_dir, db) = open_temp_db();
        let user_id = db.insert_user("alice", "$salt$digest").unwrap();

        db.touch_last_login(user_id, 1234).unwrap();
        let user = db.find_user_by_name("alice").unwrap().unwrap();
        assert_eq!(user.password_hash, "$salt$digest");
        assert_eq!(user.last_login, Some(1234));

        db.insert_session(user_id, "tok", 42).unwrap();
        let session = db.find_session_by_token("tok").unwrap().unwrap();
        assert_eq!(session.user_id, user_id);

        db.slide_session_expiry(session.id, 99).unwrap();
        assert_eq!(
            db.find_session_by_token("tok").unwrap().unwrap().expires,
            99
        );

        db.delete_session(session.id).unwrap();
        assert!(db.find_session_by_token("tok").unwrap().is_none());
    }
}
