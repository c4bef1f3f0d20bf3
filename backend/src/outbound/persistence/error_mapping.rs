//! Translation of pool and Diesel failures into [`UserPersistenceError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::UserValidationError;
use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Pool failures mean the store is unreachable.
pub(crate) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Rows that no longer satisfy domain validation.
pub(crate) fn map_row_error(error: UserValidationError) -> UserPersistenceError {
    warn!(%error, "stored user failed validation");
    UserPersistenceError::query(format!("stored user is invalid: {error}"))
}

fn is_email_conflict(message: &str, constraint: Option<&str>) -> bool {
    constraint.is_some_and(|name| name == EMAIL_CONSTRAINT) || message.contains(EMAIL_CONSTRAINT)
}

/// Map Diesel errors, logging the raw database detail at debug level.
pub(crate) fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation
                if is_email_conflict(info.message(), info.constraint_name()) =>
            {
                UserPersistenceError::email_taken()
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                UserPersistenceError::missing_user("referenced user")
            }
            DatabaseErrorKind::ClosedConnection => {
                UserPersistenceError::connection("database connection error")
            }
            _ => UserPersistenceError::query("database error"),
        },
        _ => UserPersistenceError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_become_connection_failures() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, UserPersistenceError::connection("timed out"));
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            map_diesel_error(DieselError::NotFound),
            UserPersistenceError::query("record not found")
        );
    }

    #[rstest]
    #[case("duplicate key value violates unique constraint \"users_email_key\"", None, true)]
    #[case("duplicate key", Some("users_email_key"), true)]
    #[case("duplicate key", Some("follows_pkey"), false)]
    fn email_conflicts_are_recognised(
        #[case] message: &str,
        #[case] constraint: Option<&str>,
        #[case] expected: bool,
    ) {
        assert_eq!(is_email_conflict(message, constraint), expected);
    }

    #[rstest]
    fn invalid_rows_are_query_failures() {
        let mapped = map_row_error(UserValidationError::EmptyName);
        assert!(matches!(mapped, UserPersistenceError::Query { .. }));
    }
}
