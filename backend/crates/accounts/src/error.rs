//! Accounts Error Types
//!
//! Accounts-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Accounts-specific result type alias
pub type AccountsResult<T> = Result<T, AccountsError>;

/// Accounts-specific error variants
#[derive(Debug, Error)]
pub enum AccountsError {
    /// Unknown user name or unusable credentials
    #[error("Invalid user name or password")]
    InvalidCredentials,

    /// Wrong password for an existing user, lockout not reached yet
    #[error("Incorrect password. You have {remaining_attempts} attempts left.")]
    WrongPassword { remaining_attempts: u16 },

    /// This failure reached the threshold and started a lockout
    #[error(
        "You have exceeded {max_failures} attempts. Your account is locked for {lockout_minutes} minutes."
    )]
    LockoutTriggered {
        max_failures: u16,
        lockout_minutes: i64,
    },

    /// Sign-in attempted while a lockout is running
    #[error("Your account is locked. Try again in {remaining_minutes} minutes.")]
    AccountLocked { remaining_minutes: i64 },

    /// Another live session already belongs to this user
    #[error(
        "You already have an active session. Continue there or sign out to sign in here."
    )]
    ActiveSessionElsewhere,

    #[error("User name already exists")]
    UserNameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Specialty already exists")]
    SpecialtyTaken,

    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Session fingerprint mismatch
    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    /// Session dropped after too long without activity
    #[error("Your session expired due to inactivity")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Value object or kernel error, kind preserved
    #[error(transparent)]
    App(#[from] AppError),

    /// Document storage error
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountsError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountsError::InvalidCredentials
            | AccountsError::WrongPassword { .. }
            | AccountsError::SessionInvalid
            | AccountsError::SessionFingerprintMismatch
            | AccountsError::SessionExpired => ErrorKind::Unauthorized,
            AccountsError::LockoutTriggered { .. } | AccountsError::AccountLocked { .. } => {
                ErrorKind::Locked
            }
            AccountsError::ActiveSessionElsewhere
            | AccountsError::UserNameTaken
            | AccountsError::EmailTaken
            | AccountsError::SpecialtyTaken => ErrorKind::Conflict,
            AccountsError::PasswordMismatch
            | AccountsError::Validation(_)
            | AccountsError::MissingHeader(_) => ErrorKind::BadRequest,
            AccountsError::Forbidden(_) => ErrorKind::Forbidden,
            AccountsError::NotFound(_) => ErrorKind::NotFound,
            AccountsError::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            AccountsError::App(err) => err.kind(),
            AccountsError::Storage(_) | AccountsError::Database(_) | AccountsError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures are rendered with a generic message so storage
    /// details never reach the client.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AccountsError::App(err) => {
                let converted = AppError::new(err.kind(), err.message().to_string());
                match err.action() {
                    Some(action) => converted.with_action(action.to_string()),
                    None => converted,
                }
            }
            AccountsError::Storage(_) | AccountsError::Database(_) | AccountsError::Internal(_) => {
                AppError::internal("An internal error occurred")
            }
            AccountsError::SessionExpired => AppError::unauthorized(self.to_string())
                .with_action("Please sign in again"),
            AccountsError::ActiveSessionElsewhere => AppError::conflict(self.to_string())
                .with_action("Sign out from the other session first"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Consume into the response-side `AppError`
    ///
    /// データベースエラーは kernel の変換で分類する (503/409 など)。
    /// Database errors are classified by the kernel conversion so pool
    /// exhaustion and constraint violations keep their status. Everything
    /// else goes through [`Self::to_app_error`].
    pub fn into_app_error(self) -> AppError {
        match self {
            AccountsError::Database(err) => AppError::from(err),
            other => other.to_app_error(),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccountsError::Database(e) => {
                tracing::error!(error = %e, "Accounts database error");
            }
            AccountsError::Storage(e) => {
                tracing::error!(error = %e, "Accounts storage error");
            }
            AccountsError::Internal(msg) => {
                tracing::error!(message = %msg, "Accounts internal error");
            }
            AccountsError::InvalidCredentials | AccountsError::WrongPassword { .. } => {
                tracing::warn!("Invalid login attempt");
            }
            AccountsError::LockoutTriggered { .. } | AccountsError::AccountLocked { .. } => {
                tracing::warn!(error = %self, "Login attempt on locked account");
            }
            AccountsError::ActiveSessionElsewhere => {
                tracing::warn!("Concurrent login rejected");
            }
            AccountsError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            _ => {
                tracing::debug!(error = %self, "Accounts error");
            }
        }
    }
}

impl IntoResponse for AccountsError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<platform::client::FingerprintError> for AccountsError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AccountsError::MissingHeader(header)
            }
        }
    }
}
