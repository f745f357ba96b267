use thiserror::Error;

/// Failure taxonomy shared by the catalog, ledger and listing code.
///
/// `Quota` is the upload-specific flavor of a validation failure; it gets its
/// own wire code so the UI can point at the file input instead of the form.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Quota(String),
    #[error("{0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn quota(message: impl Into<String>) -> Self {
        DomainError::Quota(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        DomainError::Persistence(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "invalid_params",
            DomainError::NotFound(_) => "not_found",
            DomainError::Quota(_) => "invalid_file",
            DomainError::Persistence(_) => "db_failed",
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}
