// ABOUTME: Typed error taxonomy shared by the settings codec and service clients
// ABOUTME: Every variant carries the offending raw value so callers can diagnose drift

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RealityError {
    /// HTTP verb outside GET, DELETE, POST, PATCH.
    InvalidMethod(String),
    /// No response was received.
    TransportFailure(String),
    UnexpectedStatus {
        status: u16,
        message: String,
    },
    UnknownSlotKind {
        job_kind: String,
        tag: String,
    },
    UnknownJobKind(String),
    UnknownOption {
        job_kind: String,
        option: String,
    },
    InvalidOptionType {
        option: String,
        expected: &'static str,
    },
    OptionParseFailure {
        option: String,
        value: String,
    },
    TokenUnavailable(String),
    MalformedPayload(String),
}

impl RealityError {
    /// HTTP status behind the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RealityError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        RealityError::MalformedPayload(what.into())
    }
}

impl fmt::Display for RealityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RealityError::InvalidMethod(method) => {
                write!(f, "Invalid method: {} is not one of GET, DELETE, POST, PATCH", method)
            }
            RealityError::TransportFailure(msg) => write!(f, "Transport failure: {}", msg),
            RealityError::UnexpectedStatus { message, .. } => {
                write!(f, "Unexpected status: {}", message)
            }
            RealityError::UnknownSlotKind { job_kind, tag } => {
                write!(f, "Unknown slot kind '{}' for job type {}", tag, job_kind)
            }
            RealityError::UnknownJobKind(kind) => write!(f, "Unknown job type: {}", kind),
            RealityError::UnknownOption { job_kind, option } => {
                write!(f, "Unknown option '{}' for job type {}", option, job_kind)
            }
            RealityError::InvalidOptionType { option, expected } => {
                write!(f, "Option '{}' expects a {} value", option, expected)
            }
            RealityError::OptionParseFailure { option, value } => {
                write!(f, "Cannot parse value '{}' of option '{}'", value, option)
            }
            RealityError::TokenUnavailable(msg) => write!(f, "Access token unavailable: {}", msg),
            RealityError::MalformedPayload(msg) => write!(f, "Malformed payload: {}", msg),
        }
    }
}

impl std::error::Error for RealityError {}

pub type Result<T> = std::result::Result<T, RealityError>;
