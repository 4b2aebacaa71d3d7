//! Cloudfiles Server — core services
//!
//! Remote file management sandboxed beneath a single data root, gated by a
//! session-token authentication layer. HTTP routing, marshalling and log
//! formatting belong to the embedding process; this crate exposes the typed
//! operations and the error taxonomy that boundary maps onto transport.

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod storage;

pub use config::ServerConfig;
pub use context::ServerContext;
