//! Auth Error Types
//!
//! Failures reported by the identity service, plus local transport and
//! internal errors. Integrates with the unified `kernel::AppError` system.

use kernel::{AppError, ErrorKind};
use platform::aws_json::RpcError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No session exists (the anonymous state, not a failure)
    #[error("No authenticated user")]
    NotAuthenticated,

    /// User not found
    #[error("User does not exist")]
    UserNotFound,

    /// User signed up but never confirmed the account
    #[error("User is not confirmed")]
    UserNotConfirmed,

    /// Wrong password, revoked token, or operation not allowed
    #[error("Incorrect username or password")]
    NotAuthorized,

    /// User name already exists
    #[error("User already exists")]
    UsernameExists,

    /// Password rejected by the pool's password policy
    #[error("Password does not conform to policy: {0}")]
    InvalidPassword(String),

    /// Confirmation code does not match
    #[error("Invalid verification code provided")]
    CodeMismatch,

    /// Confirmation code has expired
    #[error("Verification code has expired")]
    ExpiredCode,

    /// Too many attempts
    #[error("Attempt limit exceeded, please try again later")]
    LimitExceeded,

    /// The service asked for a challenge this client does not answer (MFA etc.)
    #[error("Unsupported authentication challenge: {0}")]
    UnsupportedChallenge(String),

    /// Any other service error
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    /// Service unreachable / timed out
    #[error("Identity service unreachable: {0}")]
    Transport(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Map a service error code (e.g. `UserNotFoundException`) to a variant
    pub fn from_service_code(code: &str, message: &str) -> Self {
        match code {
            "UserNotFoundException" => AuthError::UserNotFound,
            "UserNotConfirmedException" => AuthError::UserNotConfirmed,
            "NotAuthorizedException" => AuthError::NotAuthorized,
            "UsernameExistsException" | "AliasExistsException" => AuthError::UsernameExists,
            "InvalidPasswordException" => AuthError::InvalidPassword(message.to_string()),
            "CodeMismatchException" => AuthError::CodeMismatch,
            "ExpiredCodeException" => AuthError::ExpiredCode,
            "LimitExceededException"
            | "TooManyRequestsException"
            | "TooManyFailedAttemptsException" => AuthError::LimitExceeded,
            _ => AuthError::Service {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::NotAuthenticated
            | AuthError::NotAuthorized
            | AuthError::UserNotConfirmed => ErrorKind::Unauthenticated,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UsernameExists => ErrorKind::Conflict,
            AuthError::InvalidPassword(_) | AuthError::CodeMismatch => ErrorKind::InvalidInput,
            AuthError::ExpiredCode => ErrorKind::Expired,
            AuthError::LimitExceeded => ErrorKind::RateLimited,
            AuthError::Transport(_) => ErrorKind::Unavailable,
            AuthError::UnsupportedChallenge(_)
            | AuthError::Service { .. }
            | AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Transport(msg) => {
                tracing::warn!(message = %msg, "Identity service unreachable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Service { code, message } => {
                tracing::error!(code = %code, message = %message, "Identity service error");
            }
            AuthError::UnsupportedChallenge(name) => {
                tracing::warn!(challenge = %name, "Unsupported sign in challenge");
            }
            AuthError::LimitExceeded => {
                tracing::warn!("Identity service rate limit hit");
            }
            _ => {
                tracing::debug!(error = %self, kind = %self.kind(), "Auth error");
            }
        }
    }
}

impl From<RpcError> for AuthError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Service { code, message, .. } => {
                AuthError::from_service_code(&code, &message)
            }
            RpcError::Timeout | RpcError::Transport(_) => AuthError::Transport(err.to_string()),
            RpcError::Json(e) => AuthError::Internal(format!("Malformed identity response: {e}")),
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_service_code() {
        assert_eq!(
            AuthError::from_service_code("UserNotFoundException", "User does not exist."),
            AuthError::UserNotFound
        );
        assert_eq!(
            AuthError::from_service_code("UserNotConfirmedException", ""),
            AuthError::UserNotConfirmed
        );
        assert_eq!(
            AuthError::from_service_code("CodeMismatchException", ""),
            AuthError::CodeMismatch
        );
        assert_eq!(
            AuthError::from_service_code("TooManyRequestsException", ""),
            AuthError::LimitExceeded
        );
        assert_eq!(
            AuthError::from_service_code("InvalidPasswordException", "too short"),
            AuthError::InvalidPassword("too short".into())
        );
        assert_eq!(
            AuthError::from_service_code("InternalErrorException", "boom"),
            AuthError::Service {
                code: "InternalErrorException".into(),
                message: "boom".into()
            }
        );
    }

    #[test]
    fn test_from_rpc_error() {
        let err: AuthError = RpcError::Service {
            status: 400,
            code: "NotAuthorizedException".into(),
            message: "Incorrect username or password.".into(),
        }
        .into();
        assert_eq!(err, AuthError::NotAuthorized);

        let err: AuthError = RpcError::Timeout.into();
        assert!(matches!(err, AuthError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_kind_and_app_error() {
        assert_eq!(AuthError::NotAuthenticated.kind(), ErrorKind::Unauthenticated);
        assert_eq!(AuthError::UsernameExists.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::ExpiredCode.kind(), ErrorKind::Expired);

        let app = AuthError::UserNotFound.to_app_error();
        assert_eq!(app.kind(), ErrorKind::NotFound);
        assert_eq!(app.message(), "User does not exist");
    }
}
