use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use shellac_library::{AuthError, DatabaseError, TokenError};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("An account with this username or email already exists")]
    DuplicateCredential,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    Unauthorized,
    #[error("Internal server error")]
    Internal(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateCredential => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // The detail of internal errors stays server side
        if let Self::Internal(detail) = &self {
            error!("Internal error: {}", detail);
        }

        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::DuplicateCredential { .. } => Self::DuplicateCredential,
            AuthError::UnknownSubject => Self::Unauthorized,
            AuthError::Token(TokenError::Signing(e)) => Self::Internal(e),
            AuthError::Token(_) => Self::Unauthorized,
            AuthError::Db(e) => e.into(),
            AuthError::HashError(e) => Self::Internal(e),
        }
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound { resource, .. } => Self::NotFound { resource },
            DatabaseError::Conflict { .. } => Self::DuplicateCredential,
            DatabaseError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_the_failure_class() {
        assert_eq!(
            ServerError::NotFound { resource: "song" }.as_status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::DuplicateCredential.as_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::InvalidCredentials.as_status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::Unauthorized.as_status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::Internal("boom".to_string()).as_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failures_stay_generic() {
        let from_wrong_password: ServerError = AuthError::InvalidCredentials.into();
        let from_expired: ServerError = AuthError::Token(TokenError::Expired).into();
        let from_unknown_subject: ServerError = AuthError::UnknownSubject.into();

        assert_eq!(from_wrong_password.to_string(), "Invalid credentials");
        assert_eq!(from_expired.to_string(), "Invalid or expired token");
        assert_eq!(from_unknown_subject.to_string(), "Invalid or expired token");
    }

    #[test]
    fn internal_errors_hide_their_detail() {
        let error = ServerError::Internal("connection refused".to_string());

        assert_eq!(error.to_string(), "Internal server error");
    }
}
