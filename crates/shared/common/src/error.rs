//! Unified application error handling.
//!
//! Every service operation returns [`AppResult`]. Domain rule violations,
//! uniqueness conflicts and database failures all funnel into [`AppError`]
//! so callers can tell "does not exist" or "already taken" apart from
//! "something went wrong".

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    /// The uniqueness guard found a conflicting row
    #[error("{0}")]
    Duplicate(String),

    /// The database rejected a write (unique or foreign key constraint)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    /// A transaction could not be opened or committed
    #[error("Transaction failed: {0}")]
    Transaction(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(sea_orm::DbErr),

    #[cfg(feature = "jwt")]
    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound => "NOT_FOUND",
            AppError::Duplicate(_) => "DUPLICATE_ENTITY",
            AppError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Transaction(_) => "TRANSACTION_FAILURE",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Conflicts are recoverable by the caller choosing another value.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::Duplicate(_) | AppError::ConstraintViolation(_)
        )
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::Duplicate(msg) => msg.clone(),
            AppError::ConstraintViolation(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                "The change conflicts with existing data".to_string()
            }

            // Hide details for internal/security errors
            AppError::Transaction(msg) => {
                tracing::error!("Transaction failure: {}", msg);
                "The operation could not be completed".to_string()
            }
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// Database Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        use sea_orm::{DbErr, SqlErr};

        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                AppError::ConstraintViolation(msg)
            }
            _ => {
                if let Some(msg) = constraint_rejection(&err) {
                    return AppError::ConstraintViolation(msg);
                }
                match err {
                    DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => AppError::NotFound,
                    other => AppError::Database(other),
                }
            }
        }
    }
}

/// Constraint failures `sql_err()` leaves unclassified, e.g. SQLite
/// reporting a `RESTRICT` foreign key as `SQLITE_CONSTRAINT_TRIGGER` (1811).
#[cfg(feature = "database")]
fn constraint_rejection(err: &sea_orm::DbErr) -> Option<String> {
    use sea_orm::sqlx::{self, error::ErrorKind};
    use sea_orm::{DbErr, RuntimeErr};

    let db_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => e,
        _ => return None,
    };

    let rejected = match db_err.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::NotNullViolation
        | ErrorKind::CheckViolation => true,
        _ => db_err.code().map_or(false, |code| is_constraint_code(&code)),
    };

    rejected.then(|| db_err.message().to_string())
}

/// SQLSTATE class 23 (Postgres) or an SQLite extended result code whose
/// primary code is `SQLITE_CONSTRAINT` (19).
#[cfg(feature = "database")]
fn is_constraint_code(code: &str) -> bool {
    if code.len() == 5 {
        return code.starts_with("23");
    }
    code.parse::<i32>().map_or(false, |c| c & 0xff == 19)
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Password(msg) => AppError::Validation(msg),
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::Duplicate(msg) => AppError::Duplicate(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn duplicate(reason: impl Into<String>) -> Self {
        AppError::Duplicate(reason.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn transaction(msg: impl Into<String>) -> Self {
        AppError::Transaction(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_app_errors() {
        let err: AppError = DomainError::duplicate("name already in use").into();
        assert!(matches!(err, AppError::Duplicate(ref m) if m == "name already in use"));
        assert!(err.is_conflict());

        let err: AppError = DomainError::password("too short").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err: AppError = DomainError::not_found("user").into();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::internal("connection reset by peer");
        assert!(!err.user_message().contains("peer"));

        let err = AppError::transaction("commit failed");
        assert_eq!(err.code(), "TRANSACTION_FAILURE");
        assert!(!err.user_message().contains("commit"));
    }

    #[cfg(feature = "database")]
    #[test]
    fn test_constraint_codes() {
        // SQLite: FK via RESTRICT trigger, unique, primary key, plain constraint
        assert!(is_constraint_code("1811"));
        assert!(is_constraint_code("2067"));
        assert!(is_constraint_code("1555"));
        assert!(is_constraint_code("19"));
        // Postgres: foreign key and unique violations
        assert!(is_constraint_code("23503"));
        assert!(is_constraint_code("23505"));

        assert!(!is_constraint_code("5"));
        assert!(!is_constraint_code("1"));
        assert!(!is_constraint_code("40001"));
        assert!(!is_constraint_code("42P01"));
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<i32> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
