//! Error types for sqlchat-db

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("DB_NAME environment variable is missing.")]
    MissingDatabaseName,

    #[error("Failed to connect to the database: {0}")]
    Connect(String),

    #[error("{0}")]
    Query(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Rollback failed: {0}")]
    Rollback(String),

    #[error("Failed to close the connection: {0}")]
    Close(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

impl From<DbError> for sqlchat_error::Error {
    fn from(value: DbError) -> Self {
        match value {
            DbError::MissingDatabaseName => sqlchat_error::Error::Configuration(value.to_string()),
            other => sqlchat_error::Error::Execution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_name_is_configuration() {
        let err: sqlchat_error::Error = DbError::MissingDatabaseName.into();
        assert_eq!(
            err,
            sqlchat_error::Error::Configuration("DB_NAME environment variable is missing.".into())
        );
    }

    #[test]
    fn driver_errors_keep_diagnostic_text() {
        let err: sqlchat_error::Error =
            DbError::Query("ERROR:  relation \"customers\" does not exist".into()).into();
        assert_eq!(
            err.to_string(),
            "Database error: ERROR:  relation \"customers\" does not exist"
        );
    }
}
