//! Error type shared by the resolver and both formatting engines.

use thiserror::Error;

use crate::locale::Domain;

/// Errors surfaced by formatting calls.
///
/// Graceful degradations (unknown currency codes, unresolved skeletons,
/// special numeric values) are not errors and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Required data is missing all the way down to `root`.
    #[error("locale data not available: {domain}/{path} is not defined at root")]
    DataNotAvailable { domain: Domain, path: String },

    /// The value cannot be coerced to a number or an instant.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A recognized option carries a value outside its domain.
    #[error("invalid option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },

    /// The locale identifier is not a well-formed language tag.
    #[error("invalid locale tag: {0}")]
    InvalidLocale(String),

    /// A data fragment exists but cannot be parsed.
    #[error("malformed locale data in {locale}/{domain}: {reason}")]
    MalformedData {
        locale: String,
        domain: Domain,
        reason: String,
    },
}

impl FormatError {
    pub(crate) fn invalid_option(key: &str, reason: impl Into<String>) -> Self {
        FormatError::InvalidOption {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
