use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::error::DatabaseError;
use sqlx::mysql::MySqlDatabaseError;

use crate::models::ApiResponse;

/// Machine-readable failure tag carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    InvalidData,
    Conflict,
    Unavailable,
    Timeout,
    Database,
    Internal,
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Connection unavailable: {0}")]
    Unavailable(sqlx::Error),

    #[error("Session setup failed: {0}")]
    Session(sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// MySQL error numbers raised when strict mode or a constraint refuses the data
const DATA_INTEGRITY_ERRORS: &[u16] = &[
    1048, // column cannot be null
    1062, // duplicate entry
    1264, // out of range value
    1265, // data truncated
    1292, // incorrect or truncated value
    1364, // field has no default value
    1366, // incorrect value for column type
    1406, // data too long
    1452, // foreign key constraint fails
];

const DUPLICATE_COLUMN: u16 = 1060;

/// Maps a MySQL server error number to the kind reported to clients
pub fn classify_mysql_error(number: u16) -> ErrorKind {
    if DATA_INTEGRITY_ERRORS.contains(&number) {
        ErrorKind::InvalidData
    } else if number == DUPLICATE_COLUMN {
        ErrorKind::Conflict
    } else {
        ErrorKind::Database
    }
}

/// Separates "could not get a connection" from "the statement failed"
pub fn acquire_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => AppError::Unavailable(err),
        other => AppError::Database(other),
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Database(sqlx::Error::Database(db)) => db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| classify_mysql_error(e.number()))
                .unwrap_or(ErrorKind::Database),
            AppError::Database(_) | AppError::Session(_) => ErrorKind::Database,
            AppError::Unavailable(_) => ErrorKind::Unavailable,
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match kind {
            ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, self.to_string()),
            ErrorKind::InvalidData => (StatusCode::UNPROCESSABLE_ENTITY, database_message(&self)),
            ErrorKind::Conflict => (StatusCode::CONFLICT, database_message(&self)),
            ErrorKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            // already logged by the connection middleware
            ErrorKind::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "database connection unavailable".to_string(),
            ),
            ErrorKind::Database | ErrorKind::Internal => {
                // Log the actual error, return generic message
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::failure(kind, message))).into_response()
    }
}

fn database_message(err: &AppError) -> String {
    match err {
        AppError::Database(sqlx::Error::Database(db)) => db.message().to_string(),
        other => other.to_string(),
    }
}

pub type AppResult<T> = Result<T, AppError>;
