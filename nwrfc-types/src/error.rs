//! Native RFC error and value conformance errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when a value does not conform to an RFC field type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("{expected} expected when filling field '{field}' of type {rfc_type}, got {actual}")]
    Mismatch {
        field: String,
        rfc_type: u32,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Integer number expected when filling field '{field}' of type {rfc_type}, got {value}")]
    NotIntegral {
        field: String,
        rfc_type: u32,
        value: f64,
    },

    #[error("unknown RFC type {0}")]
    UnknownType(u32),

    #[error("parameter '{parameter}' not found in function module {function}")]
    UnknownParameter { function: String, parameter: String },

    #[error("field '{field}' not found in type {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("type description missing for field '{0}'")]
    MissingTypeDescription(String),
}

/// Error groups reported by the NW RFC SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfcErrorGroup {
    Ok,
    AbapApplicationFailure,
    AbapRuntimeFailure,
    LogonFailure,
    CommunicationFailure,
    ExternalRuntimeFailure,
    ExternalApplicationFailure,
    ExternalAuthorizationFailure,
}

impl RfcErrorGroup {
    /// Returns whether the error originated in the ABAP backend.
    pub fn is_abap(&self) -> bool {
        matches!(
            self,
            RfcErrorGroup::AbapApplicationFailure | RfcErrorGroup::AbapRuntimeFailure
        )
    }
}

impl fmt::Display for RfcErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RfcErrorGroup::Ok => write!(f, "OK"),
            RfcErrorGroup::AbapApplicationFailure => write!(f, "ABAP_APPLICATION_FAILURE"),
            RfcErrorGroup::AbapRuntimeFailure => write!(f, "ABAP_RUNTIME_FAILURE"),
            RfcErrorGroup::LogonFailure => write!(f, "LOGON_FAILURE"),
            RfcErrorGroup::CommunicationFailure => write!(f, "COMMUNICATION_FAILURE"),
            RfcErrorGroup::ExternalRuntimeFailure => write!(f, "EXTERNAL_RUNTIME_FAILURE"),
            RfcErrorGroup::ExternalApplicationFailure => {
                write!(f, "EXTERNAL_APPLICATION_FAILURE")
            }
            RfcErrorGroup::ExternalAuthorizationFailure => {
                write!(f, "EXTERNAL_AUTHORIZATION_FAILURE")
            }
        }
    }
}

/// Error produced by the native connection object.
///
/// The facade never inspects or rewrites these; they travel to the caller as
/// the native layer reported them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{group} ({code}) {key}: {message}")]
pub struct RfcError {
    pub group: RfcErrorGroup,
    pub code: i32,
    pub key: String,
    pub message: String,
}

impl RfcError {
    pub fn new(
        group: RfcErrorGroup,
        code: i32,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            group,
            code,
            key: key.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a communication failure (`RFC_COMMUNICATION_FAILURE`).
    pub fn communication(message: impl Into<String>) -> Self {
        Self::new(
            RfcErrorGroup::CommunicationFailure,
            1,
            "RFC_COMMUNICATION_FAILURE",
            message,
        )
    }

    /// Shorthand for a logon failure (`RFC_LOGON_FAILURE`).
    pub fn logon(message: impl Into<String>) -> Self {
        Self::new(RfcErrorGroup::LogonFailure, 2, "RFC_LOGON_FAILURE", message)
    }

    /// Shorthand for an ABAP application exception raised by a function module.
    pub fn abap_exception(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RfcErrorGroup::AbapApplicationFailure, 5, key, message)
    }
}

impl From<TypeError> for RfcError {
    fn from(err: TypeError) -> Self {
        Self::new(
            RfcErrorGroup::ExternalApplicationFailure,
            22,
            "RFC_INVALID_PARAMETER",
            err.to_string(),
        )
    }
}
