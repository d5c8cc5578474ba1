use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobBoardError {
    #[error("InvalidParameter({0})")]
    InvalidParameter(String),
    #[error("InvalidFilter({0})")]
    InvalidFilter(String),
    #[error("NotFound({0})")]
    NotFound(String),
    #[error("DuplicateKey({0})")]
    DuplicateKey(String),
    #[error("StorageUnavailable({0})")]
    StorageUnavailable(String),
    #[error("DBError({0:?})")]
    DBError(sqlx::Error),
    #[error("serde_json error({0:?})")]
    SerdeJsonError(serde_json::error::Error),
    #[error("RuntimeError({0})")]
    RuntimeError(String),
}

impl JobBoardError {
    /// Stable name of the error kind, reported to MCP clients.
    pub fn kind(&self) -> &'static str {
        match self {
            JobBoardError::InvalidParameter(_) => "InvalidParameter",
            JobBoardError::InvalidFilter(_) => "InvalidFilter",
            JobBoardError::NotFound(_) => "NotFound",
            JobBoardError::DuplicateKey(_) => "DuplicateKey",
            JobBoardError::StorageUnavailable(_) => "StorageUnavailable",
            JobBoardError::DBError(_) => "DBError",
            JobBoardError::SerdeJsonError(_) => "SerdeJsonError",
            JobBoardError::RuntimeError(_) => "RuntimeError",
        }
    }

    /// Errors caused by the request itself (the caller can fix them).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            JobBoardError::InvalidParameter(_)
                | JobBoardError::InvalidFilter(_)
                | JobBoardError::NotFound(_)
                | JobBoardError::DuplicateKey(_)
        )
    }
}

pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

impl From<sqlx::Error> for JobBoardError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                JobBoardError::DuplicateKey(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => JobBoardError::StorageUnavailable(e.to_string()),
            _ => JobBoardError::DBError(e),
        }
    }
}

impl From<serde_json::Error> for JobBoardError {
    fn from(e: serde_json::Error) -> Self {
        JobBoardError::SerdeJsonError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pool_errors() {
        let e: JobBoardError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(e, JobBoardError::StorageUnavailable(_)));
        assert_eq!(e.kind(), "StorageUnavailable");
        assert!(!e.is_client_error());

        let e: JobBoardError = sqlx::Error::RowNotFound.into();
        assert!(matches!(e, JobBoardError::DBError(_)));
    }

    #[test]
    fn test_client_errors() {
        assert!(JobBoardError::NotFound("job".to_string()).is_client_error());
        assert!(JobBoardError::DuplicateKey("job".to_string()).is_client_error());
        assert!(JobBoardError::InvalidFilter("range".to_string()).is_client_error());
        assert!(!JobBoardError::RuntimeError("conf".to_string()).is_client_error());
    }
}
