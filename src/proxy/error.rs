use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyErrorKind {
    NotAdmin,
    UnknownImplementation,
    DuplicateImplementation,
    IncompatibleLayout,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ProxyError {
    pub kind: ProxyErrorKind,
    pub message: String,
}

impl ProxyError {
    pub fn new(kind: ProxyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn not_admin(message: impl Into<String>) -> ProxyError {
    ProxyError::new(ProxyErrorKind::NotAdmin, message)
}

pub fn unknown_implementation(message: impl Into<String>) -> ProxyError {
    ProxyError::new(ProxyErrorKind::UnknownImplementation, message)
}

pub fn duplicate_implementation(message: impl Into<String>) -> ProxyError {
    ProxyError::new(ProxyErrorKind::DuplicateImplementation, message)
}

pub fn incompatible_layout(message: impl Into<String>) -> ProxyError {
    ProxyError::new(ProxyErrorKind::IncompatibleLayout, message)
}

pub fn persistence_error(message: impl Into<String>) -> ProxyError {
    ProxyError::new(ProxyErrorKind::Persistence, message)
}
