use error_stack::Report;
use thiserror::Error;

pub type Result<T, C = Error> = error_stack::Result<T, C>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Postgres connection URL")]
    InvalidUrl,
    #[error("Database pool is unhealthy")]
    UnhealthyPool,
    #[error("Attempted to write into a read-only database")]
    Readonly,
    #[error("Failed to run database migrations")]
    Migrate(sqlx::migrate::MigrateError),
    #[error("Internal database error")]
    Internal(sqlx::Error),
}

// SQLSTATE for `read_only_sql_transaction`
const READONLY_CODE: &str = "25006";

pub trait ErrorExt<T> {
    /// Converts an [`sqlx`] error into a contextful [`Error`] report.
    fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn into_db_error(self) -> Result<T> {
        self.map_err(|e| {
            let readonly = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(READONLY_CODE)
            );
            if readonly {
                Report::new(Error::Readonly)
            } else {
                Report::new(Error::Internal(e))
            }
        })
    }
}

pub trait ErrorExt2 {
    /// Whether the error means that the pool has no usable
    /// connections at the moment.
    fn is_unhealthy(&self) -> bool;
}

impl ErrorExt2 for Report<Error> {
    fn is_unhealthy(&self) -> bool {
        matches!(self.current_context(), Error::UnhealthyPool)
    }
}
