use thiserror::Error;

use crate::config::ConfigError;
use crate::ingest::IngestError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid customer record `{account_code}`: {field} {reason}")]
    InvalidRecord { account_code: String, field: &'static str, reason: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl ApplicationError {
    /// Stable machine-readable class used in command envelopes.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Ingest(_) => "input_load",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Ingest(_) | Self::Domain(_) => 3,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "A customer record failed validation. Check the input values.",
            Self::Ingest(_) => "The input file could not be read. Check the path and format.",
            Self::Configuration(_) => "Configuration is invalid. Run `salesai config` to inspect it.",
        }
    }
}
