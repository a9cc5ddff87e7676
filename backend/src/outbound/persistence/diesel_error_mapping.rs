//! Classification of Diesel failures shared by every repository.
//!
//! Each repository turns a [`DieselFailure`] into its own port error, so the
//! inspection of `DatabaseErrorKind` lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, error};

/// Coarse category of a Diesel error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(&'static str),
    /// The statement failed for any other reason.
    Query(&'static str),
    /// A unique constraint rejected the write; carries the constraint name.
    UniqueViolation(Option<&'static str>),
    /// PostgreSQL aborted the transaction to preserve serializability.
    Contention,
}

const USERS_EMAIL_KEY: &str = "users_email_key";

/// Categorise `error`, logging unexpected failures.
pub(crate) fn classify_diesel_error(err: &DieselError, operation: &'static str) -> DieselFailure {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!(operation, message = info.message(), "unique constraint rejected write");
            let constraint = info
                .constraint_name()
                .filter(|name| *name == USERS_EMAIL_KEY)
                .map(|_| USERS_EMAIL_KEY);
            DieselFailure::UniqueViolation(constraint)
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            debug!(operation, message = info.message(), "transaction serialization failure");
            DieselFailure::Contention
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            error!(operation, message = info.message(), "database connection closed");
            DieselFailure::Connection("database connection error")
        }
        DieselError::DatabaseError(kind, info) => {
            error!(operation, ?kind, message = info.message(), "diesel operation failed");
            DieselFailure::Query("database error")
        }
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => {
            error!(operation, "diesel query could not be built");
            DieselFailure::Query("database query error")
        }
        other => {
            error!(
                operation,
                error_type = %std::any::type_name_of_val(other),
                "diesel operation failed"
            );
            DieselFailure::Query("database error")
        }
    }
}

/// Whether a unique violation came from the email constraint.
pub(crate) fn is_duplicate_email(failure: DieselFailure) -> bool {
    failure == DieselFailure::UniqueViolation(Some(USERS_EMAIL_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    struct Info {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "simulated"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }

    #[rstest]
    #[case(
        database_error(DatabaseErrorKind::UniqueViolation, Some("users_email_key")),
        DieselFailure::UniqueViolation(Some("users_email_key"))
    )]
    #[case(
        database_error(DatabaseErrorKind::UniqueViolation, Some("users_pkey")),
        DieselFailure::UniqueViolation(None)
    )]
    #[case(
        database_error(DatabaseErrorKind::SerializationFailure, None),
        DieselFailure::Contention
    )]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection, None),
        DieselFailure::Connection("database connection error")
    )]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation, None),
        DieselFailure::Query("database error")
    )]
    #[case(DieselError::NotFound, DieselFailure::Query("record not found"))]
    fn classifies_errors(#[case] err: DieselError, #[case] expected: DieselFailure) {
        assert_eq!(classify_diesel_error(&err, "test"), expected);
    }

    #[rstest]
    fn only_email_constraint_is_duplicate_email() {
        assert!(is_duplicate_email(DieselFailure::UniqueViolation(Some(
            USERS_EMAIL_KEY
        ))));
        assert!(!is_duplicate_email(DieselFailure::UniqueViolation(None)));
    }
}
