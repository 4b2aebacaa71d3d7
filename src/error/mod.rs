//! Error handling
//!
//! Defines error types and handling for the server.

pub mod handlers;
pub mod types;

pub use handlers::{handle_error, status_code};
pub use types::*;
