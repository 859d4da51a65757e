//! Translation of pool and Diesel failures into [`GatewayError`].

use tracing::debug;

use crate::domain::ports::GatewayError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> GatewayError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            GatewayError::connection(message)
        }
    }
}

/// Driver details are logged at debug level and kept out of the error text.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> GatewayError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

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
        DieselError::NotFound => GatewayError::query("record not found"),
        DieselError::QueryBuilderError(_) => GatewayError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            GatewayError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            GatewayError::query("unique constraint violated")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            GatewayError::query("referenced record is missing")
        }
        DieselError::DeserializationError(_) => {
            GatewayError::corrupt("stored value could not be decoded")
        }
        _ => GatewayError::query("database error"),
    }
}
