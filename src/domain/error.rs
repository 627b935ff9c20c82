//! Error taxonomy shared by the catalog services

use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A referenced application, event or notification does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The child exists but belongs to a different parent
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A uniqueness rule rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(key) => {
                CatalogError::Conflict(format!("duplicate value for {}", key))
            }
            StoreError::NotFound(what) => CatalogError::NotFound(what),
            other => CatalogError::Storage(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Check a string field's length in characters.
pub(crate) fn check_length(
    field: &str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> CatalogResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(CatalogError::Validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    if let Some(max) = max {
        if len > max {
            return Err(CatalogError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
    }
    Ok(())
}
