//! Authentication system
//!
//! Credential storage/verification and the session-token state machine.

pub mod credentials;
pub mod session;

pub use credentials::CredentialVault;
pub use session::SessionManager;

/// Proof of identity supplied with a request.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Opaque token issued by a previous login.
    Token(String),
    /// Username/password fallback, checked directly; no session is minted.
    Basic { username: String, password: String },
}
