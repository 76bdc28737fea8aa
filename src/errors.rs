use crate::core::validation::FieldErrors;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Integrity error: {message}")]
    Integrity { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Authentication credentials were not provided")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("Invalid page")]
    InvalidPage,

    #[error("JSON parse error - {message}")]
    MalformedBody { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a missing row of the given resource kind.
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if err.sql_err().is_some() || is_constraint_violation(&err) {
            return Self::Integrity {
                message: err.to_string(),
            };
        }
        Self::Database {
            message: err.to_string(),
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

// SeaORM only classifies unique and foreign key violations; SQLite reports
// NOT NULL and CHECK failures as plain execution errors.
fn is_constraint_violation(err: &DbErr) -> bool {
    err.to_string().contains("constraint failed")
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
