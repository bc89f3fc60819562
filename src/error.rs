//! Error handling for the extension subsystem
//!
//! Every failure an extension operation can hit is represented here. None of
//! them are fatal to a host: the dispatch operations catch them per extension,
//! log them and collect them into reports.

use crate::host::HostRef;
use crate::persistence::PersistenceError;

/// Main error type for extension operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtensionError {
    #[error("Duplicate extension: '{name}' is already attached")]
    DuplicateExtension { name: String },

    #[error("Extension not found: '{name}'")]
    ExtensionNotFound { name: String },

    #[error("Extension '{name}' does not support transfer")]
    NotTransferable { name: String },

    #[error("Missing tag key: '{key}'")]
    MissingKey { key: String },

    #[error("Malformed tag at '{key}': expected {expected}, found {found}")]
    MalformedTag {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Deserialization failed for extension '{name}': {reason}")]
    DeserializeFailed { name: String, reason: String },

    #[error("Transfer failed for extension '{name}': {reason}")]
    TransferFailed { name: String, reason: String },

    #[error("Transfer of '{expected}' produced an extension named '{found}'")]
    TransferNameMismatch { expected: String, found: String },

    #[error("Registration event already fired for host {host}")]
    RegistrationAlreadyFired { host: HostRef },

    #[error("Registration event has not fired for host {host}")]
    RegistrationNotFired { host: HostRef },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Type alias for Results in the extension subsystem
pub type ExtensionResult<T> = Result<T, ExtensionError>;

impl ExtensionError {
    /// Shorthand for a malformed tag error
    pub fn malformed(key: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        ExtensionError::MalformedTag {
            key: key.into(),
            expected,
            found,
        }
    }

    /// Shorthand for a deserialize failure with a free-form reason
    pub fn deserialize_failed(name: impl Into<String>, reason: impl ToString) -> Self {
        ExtensionError::DeserializeFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a transfer failure with a free-form reason
    pub fn transfer_failed(name: impl Into<String>, reason: impl ToString) -> Self {
        ExtensionError::TransferFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<PersistenceError> for ExtensionError {
    fn from(err: PersistenceError) -> Self {
        ExtensionError::Persistence(err.to_string())
    }
}

// Helper functions for common error patterns

/// Convert Option to Result for tag lookups
pub trait OptionExt<T> {
    fn or_missing(self, key: &str) -> ExtensionResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_missing(self, key: &str) -> ExtensionResult<T> {
        self.ok_or_else(|| ExtensionError::MissingKey {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCategory, HostId};

    #[test]
    fn test_error_display() {
        let err = ExtensionError::malformed("score.value", "int", "string");
        assert_eq!(
            err.to_string(),
            "Malformed tag at 'score.value': expected int, found string"
        );
    }

    #[test]
    fn test_host_in_message() {
        let err = ExtensionError::RegistrationNotFired {
            host: HostRef::new(HostId(7), HostCategory::Player),
        };
        assert_eq!(
            err.to_string(),
            "Registration event has not fired for host player#7"
        );
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.or_missing("value");
        assert_eq!(
            result,
            Err(ExtensionError::MissingKey {
                key: "value".to_string()
            })
        );
        assert_eq!(Some(3).or_missing("value"), Ok(3));
    }

    #[test]
    fn test_persistence_conversion() {
        let err: ExtensionError = PersistenceError::CorruptedData("bad magic".to_string()).into();
        assert_eq!(
            err,
            ExtensionError::Persistence("Corrupted data: bad magic".to_string())
        );
    }
}
