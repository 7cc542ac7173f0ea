//! Diesel and pool error mapping shared by the repositories.
//!
//! Each repository passes its port error constructors in, so the mapping
//! rules live in one place while the error types stay per port.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through a repository's connection constructor.
pub(crate) fn map_basic_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map a Diesel failure through a repository's query and connection
/// constructors. Database details are logged at debug level, never returned.
pub(crate) fn map_basic_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), constraint = ?info.constraint_name(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// True when `error` is a unique violation, optionally of a named constraint.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: Option<&str>) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => constraint
            .is_none_or(|expected| info.constraint_name().is_none_or(|name| name == expected)),
        _ => false,
    }
}
