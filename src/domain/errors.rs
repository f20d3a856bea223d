use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Insufficient stock or unavailable")]
    InsufficientStock,
    #[error("Insufficient fund")]
    InsufficientFund,
    #[error("Invalid change")]
    InvalidChange,
    #[error("Failed to save data: {0}")]
    SavingData(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure modes of the atomic commit. Only `Domain` is surfaced as-is;
/// the other two are retried by the checkout coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("Stock of product {0} changed since it was read")]
    StaleStock(Uuid),
    #[error("Transient storage failure: {0}")]
    Transient(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(DomainError::NotFound.to_string(), "Not found");
        assert_eq!(
            DomainError::InsufficientStock.to_string(),
            "Insufficient stock or unavailable"
        );
        assert_eq!(DomainError::InsufficientFund.to_string(), "Insufficient fund");
        assert_eq!(DomainError::InvalidChange.to_string(), "Invalid change");
        assert_eq!(
            DomainError::SavingData("lock timeout".to_string()).to_string(),
            "Failed to save data: lock timeout"
        );
    }

    #[test]
    fn commit_error_is_transparent_over_domain_error() {
        let err: CommitError = DomainError::NotFound.into();
        assert_eq!(err.to_string(), "Not found");
    }
}
