//! Error model for role registration and identity resolution.
//! Configuration problems are fatal at startup and surfaced to the operator;
//! accessing an unregistered role is a programmer error. A stored
//! impersonation id that no longer resolves is NOT an error here; the
//! engine falls back to the true principal (see `resolve`).

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    Configuration { code: String, message: String },
    UnknownRole { code: String, message: String },
}

impl IdentityError {
    pub fn code_str(&self) -> &str {
        match self {
            IdentityError::Configuration { code, .. }
            | IdentityError::UnknownRole { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            IdentityError::Configuration { message, .. }
            | IdentityError::UnknownRole { message, .. } => message.as_str(),
        }
    }

    pub fn configuration(code: impl Into<String>, msg: impl Into<String>) -> Self {
        IdentityError::Configuration { code: code.into(), message: msg.into() }
    }

    pub fn duplicate_role(name: &str) -> Self {
        Self::configuration("duplicate_role", format!("role '{}' is already registered", name))
    }

    pub fn self_impersonator(name: &str) -> Self {
        Self::configuration(
            "self_impersonator",
            format!("role '{}' cannot name itself as impersonator_role", name),
        )
    }

    pub fn unknown_impersonator(name: &str, referenced: &str) -> Self {
        Self::configuration(
            "unknown_impersonator",
            format!(
                "role '{}' references impersonator role '{}' which is not registered; register it first",
                name, referenced
            ),
        )
    }

    pub fn impersonator_chain(name: &str, referenced: &str) -> Self {
        Self::configuration(
            "impersonator_chain",
            format!(
                "role '{}' references impersonator role '{}' which is itself impersonator-backed; chains are not supported",
                name, referenced
            ),
        )
    }

    pub fn missing_lookup(name: &str) -> Self {
        Self::configuration("missing_lookup", format!("no lookup supplied for declared role '{}'", name))
    }

    pub fn unknown_role(name: &str) -> Self {
        IdentityError::UnknownRole {
            code: "unknown_role".into(),
            message: format!("role '{}' is not registered", name),
        }
    }

    /// True for errors that must abort startup rather than a single request.
    pub fn is_configuration(&self) -> bool {
        matches!(self, IdentityError::Configuration { .. })
    }
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for IdentityError {}

pub type IdentityResult<T> = Result<T, IdentityError>;
