//! Process context
//!
//! Explicit composition root: built once from configuration at startup and
//! passed by reference into whatever hosts the services. Replaces the
//! hidden global state a singleton config/DB engine would carry, and lets
//! tests run isolated instances side by side.

use std::sync::Arc;

use crate::auth::{CredentialVault, SessionManager};
use crate::config::ServerConfig;
use crate::db::{Database, SqliteDb};
use crate::error::ServerError;
use crate::storage::FileStore;

pub struct ServerContext {
    pub config: ServerConfig,
    pub files: FileStore,
    pub vault: CredentialVault,
    pub sessions: SessionManager,
}

impl ServerContext {
    /// Build the full context, opening the configured sqlite store.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let db: Arc<dyn Database> = Arc::new(SqliteDb::open(&config.database_path)?);
        Self::with_database(config, db)
    }

    /// Build the context over an injected store. Used by tests and by
    /// embedders that bring their own persistence.
    pub fn with_database(
        config: ServerConfig,
        db: Arc<dyn Database>,
    ) -> Result<Self, ServerError> {
        let files = FileStore::new(config.data_root_path())?;
        let vault = CredentialVault::new(Arc::clone(&db));
        let sessions = SessionManager::new(db, vault.clone(), config.session_expiry());
        Ok(Self {
            config,
            files,
            vault,
            sessions,
        })
    }
}
