//! Client error types.

use crate::binding::BindingError;
use nwrfc_types::{RfcError, RfcErrorGroup};
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An argument failed validation before reaching the native connection.
    #[error("type error: {0}")]
    TypeMismatch(String),

    #[error("callback function must be supplied")]
    MissingCallback,

    #[error(transparent)]
    Rfc(#[from] RfcError),

    #[error("native connection dropped the completion callback")]
    CallbackDropped,

    #[error("native connection panicked: {0}")]
    NativePanic(String),

    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl ClientError {
    /// Returns whether this error was raised by argument validation.
    pub fn is_type_error(&self) -> bool {
        matches!(self, ClientError::TypeMismatch(_) | ClientError::MissingCallback)
    }

    /// Returns the native error, if the failure came from the backend.
    pub fn rfc_error(&self) -> Option<&RfcError> {
        match self {
            ClientError::Rfc(e) => Some(e),
            _ => None,
        }
    }

    /// Returns whether the backend reported a broken or missing connection.
    pub fn is_communication_failure(&self) -> bool {
        self.rfc_error()
            .is_some_and(|e| e.group == RfcErrorGroup::CommunicationFailure)
    }
}
