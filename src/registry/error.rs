use serde::Serialize;

use crate::proxy::storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryErrorKind {
    NotOwner,
    InvalidState,
    AmountMismatch,
    EmptyBatch,
    AlreadyInitialized,
    NotFound,
    InvalidRequest,
    UnsupportedCall,
    Arithmetic,
    StorageLayout,
    InvariantViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct RegistryError {
    pub kind: RegistryErrorKind,
    pub message: String,
}

impl RegistryError {
    pub fn new(kind: RegistryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        storage_layout(err.to_string())
    }
}

pub fn not_owner(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::NotOwner, message)
}

pub fn invalid_state(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::InvalidState, message)
}

pub fn amount_mismatch(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::AmountMismatch, message)
}

pub fn empty_batch(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::EmptyBatch, message)
}

pub fn already_initialized(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::AlreadyInitialized, message)
}

pub fn not_found(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::NotFound, message)
}

pub fn invalid_request(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::InvalidRequest, message)
}

pub fn unsupported_call(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::UnsupportedCall, message)
}

pub fn arithmetic_error(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::Arithmetic, message)
}

pub fn storage_layout(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::StorageLayout, message)
}

pub fn invariant_violation(message: impl Into<String>) -> RegistryError {
    RegistryError::new(RegistryErrorKind::InvariantViolation, message)
}
