//! Error handlers
//!
//! Maps core errors onto transport statuses for the HTTP-facing collaborator.

use log::error;

use crate::error::types::{AuthError, FileError, ServerError};

/// Log a server error at the boundary
pub fn handle_error(err: &ServerError) {
    error!("Server error: {}", err);
}

/// Convert an error to the HTTP status code the boundary should emit.
///
/// `AuthFailed` maps to 401 so the boundary can answer with an
/// authentication challenge instead of a generic client error.
pub fn status_code(err: &ServerError) -> u16 {
    match err {
        ServerError::File(FileError::InvalidPath(_)) => 400,
        ServerError::File(FileError::NotFound(_)) => 404,
        ServerError::File(FileError::NotEmpty(_)) => 409,
        ServerError::File(FileError::Io(_)) => 500,
        ServerError::Auth(AuthError::AuthFailed) => 401,
        ServerError::Auth(AuthError::Store(_)) => 500,
        ServerError::Db(_) => 500,
        ServerError::Config(_) => 500,
        ServerError::Io(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn status_codes_distinguish_auth_from_file_errors() {
        let invalid = ServerError::from(FileError::InvalidPath("..".into()));
        let missing = ServerError::from(FileError::NotFound("x".into()));
        let occupied = ServerError::from(FileError::NotEmpty("d".into()));
        let auth = ServerError::from(AuthError::AuthFailed);
        let io = ServerError::from(FileError::Io(io::Error::other("disk full")));

        assert_eq!(status_code(&invalid), 400);
        assert_eq!(status_code(&missing), 404);
        assert_eq!(status_code(&occupied), 409);
        assert_eq!(status_code(&auth), 401);
        assert_eq!(status_code(&io), 500);
    }
}
