//! Error types for stockmark.

use thiserror::Error;

/// Result type alias using stockmark's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// SQLSTATE for a serialization failure between concurrent transactions.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for a detected deadlock.
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE class prefix for data exceptions (bad encoding, NUL bytes, overflow).
const DATA_EXCEPTION_CLASS: &str = "22";

/// Core error type for stockmark operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stock not found
    #[error("Stock not found: {0}")]
    StockNotFound(i32),

    /// A uniqueness race could not be settled (e.g. a tag name inserted by a
    /// concurrent transaction that is not yet visible)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], used by boundary layers to pick an
/// outward signal without matching on driver details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested row does not exist.
    NotFound,
    /// A constraint rejected a write, or the write lost a race with a
    /// concurrent transaction (deadlock, serialization failure).
    ConstraintViolation,
    /// The store could not be reached or the pool is exhausted/closed.
    Connection,
    /// The caller supplied unusable input.
    Validation,
    /// Anything else.
    Internal,
}

impl Error {
    /// Classify this error into the service's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) | Error::StockNotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::ConstraintViolation,
            Error::Config(_) => ErrorKind::Validation,
            Error::Database(err) => classify_sqlx(err),
        }
    }
}

fn classify_sqlx(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            match code.as_deref() {
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    return ErrorKind::ConstraintViolation
                }
                Some(c) if c.starts_with(DATA_EXCEPTION_CLASS) => return ErrorKind::Validation,
                _ => {}
            }
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => ErrorKind::ConstraintViolation,
                _ => ErrorKind::Internal,
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => ErrorKind::Connection,
        _ => ErrorKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    /// Minimal driver error carrying only a SQLSTATE and a kind.
    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
        unique: bool,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sqlstate {}", self.code)
        }
    }

    impl StdError for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }
    }

    fn db_error(code: &'static str, unique: bool) -> Error {
        Error::Database(sqlx::Error::Database(Box::new(FakeDbError { code, unique })))
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("stock with symbol 'AAPL'".to_string());
        assert_eq!(err.to_string(), "Not found: stock with symbol 'AAPL'");
    }

    #[test]
    fn test_error_display_stock_not_found() {
        let err = Error::StockNotFound(42);
        assert_eq!(err.to_string(), "Stock not found: 42");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("tag 'tech'".to_string());
        assert_eq!(err.to_string(), "Conflict: tag 'tech'");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("PORT is not a number".to_string());
        assert_eq!(err.to_string(), "Configuration error: PORT is not a number");
    }

    #[test]
    fn test_not_found_kinds() {
        assert_eq!(Error::StockNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(Error::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_connection_kinds() {
        assert_eq!(
            Error::Database(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Connection
        );
        assert_eq!(
            Error::Database(sqlx::Error::PoolClosed).kind(),
            ErrorKind::Connection
        );

        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            Error::Database(sqlx::Error::Io(io_err)).kind(),
            ErrorKind::Connection
        );
    }

    #[test]
    fn test_conflict_is_constraint_violation() {
        assert_eq!(
            Error::Conflict("dup".into()).kind(),
            ErrorKind::ConstraintViolation
        );
    }

    #[test]
    fn test_unique_violation_is_constraint_violation() {
        let err = db_error("23505", true);
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_deadlock_and_serialization_failure_are_constraint_violations() {
        let deadlock = db_error(DEADLOCK_DETECTED, false);
        assert_eq!(deadlock.kind(), ErrorKind::ConstraintViolation);

        let serialization = db_error(SERIALIZATION_FAILURE, false);
        assert_eq!(serialization.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_data_exception_is_validation() {
        // character_not_in_repertoire, raised for a NUL byte in text
        let err = db_error("22021", false);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_other_database_error_is_internal() {
        // undefined_table
        let err = db_error("42P01", false);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_config_is_validation() {
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
