//! Error types
//!
//! Defines domain-specific error types for each module of the server.

use std::fmt;
use std::io;

/// Storage module errors
#[derive(Debug)]
pub enum FileError {
    /// Caller-supplied path failed sandbox validation; disk was never touched.
    InvalidPath(String),
    NotFound(String),
    /// Non-recursive deletion of a directory that still has entries.
    NotEmpty(String),
    /// Unexpected OS-level failure (permission denied, disk full, ...).
    Io(io::Error),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            FileError::NotFound(p) => write!(f, "Not found: {}", p),
            FileError::NotEmpty(p) => write!(f, "Directory is not empty: {}", p),
            FileError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FileError {}

impl From<io::Error> for FileError {
    fn from(error: io::Error) -> Self {
        FileError::Io(error)
    }
}

/// Persistence layer errors
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Uniqueness or referential constraint violated in the in-memory store.
    Constraint(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Sqlite(e) => write!(f, "Database error: {}", e),
            DbError::Constraint(msg) => write!(f, "Constraint violation: {}", msg),
        }
    }
}

impl std::error::Error for DbError {}

impl From<rusqlite::Error> for DbError {
    fn from(error: rusqlite::Error) -> Self {
        DbError::Sqlite(error)
    }
}

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    /// Bad credentials or a missing/expired token.
    AuthFailed,
    /// The session/user store itself failed.
    Store(DbError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AuthFailed => write!(f, "Authentication failed"),
            AuthError::Store(e) => write!(f, "Session store error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<DbError> for AuthError {
    fn from(error: DbError) -> Self {
        AuthError::Store(error)
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    File(FileError),
    Auth(AuthError),
    Db(DbError),
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::File(e) => write!(f, "Storage error: {}", e),
            ServerError::Auth(e) => write!(f, "Authentication error: {}", e),
            ServerError::Db(e) => write!(f, "Database error: {}", e),
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<FileError> for ServerError {
    fn from(error: FileError) -> Self {
        ServerError::File(error)
    }
}

impl From<AuthError> for ServerError {
    fn from(error: AuthError) -> Self {
        ServerError::Auth(error)
    }
}

impl From<DbError> for ServerError {
    fn from(error: DbError) -> Self {
        ServerError::Db(error)
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
