//! Migration-specific error types.

use crate::script::ScriptError;
use thiserror::Error;

/// Boxed error produced by a user migration callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Migration-specific errors.
///
/// Unknown property names are not represented here: any key handed to a
/// builder setter is recorded as a step.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration callback failed. No plan is delivered.
    #[error("migration callback failed: {source}")]
    Callback {
        /// The error returned by the callback.
        #[source]
        source: CallbackError,
    },

    /// A call script could not be loaded or replayed.
    #[error("call script error: {0}")]
    Script(#[from] ScriptError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MigrationError {
    /// Wrap an error returned by a migration callback.
    pub fn callback(source: impl Into<CallbackError>) -> Self {
        MigrationError::Callback {
            source: source.into(),
        }
    }

    /// Check whether this error came from the user callback.
    pub fn is_callback(&self) -> bool {
        matches!(self, MigrationError::Callback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_error_display() {
        let err = MigrationError::callback("boom");
        assert!(err.is_callback());
        assert_eq!(err.to_string(), "migration callback failed: boom");
    }

    #[test]
    fn test_callback_error_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = MigrationError::callback(io);
        let source = err.source().expect("callback error has a source");
        assert_eq!(source.to_string(), "disk gone");
    }

    #[test]
    fn test_script_error_conversion() {
        let err: MigrationError = ScriptError::UnknownHandle {
            index: 3,
            handle: "person".to_string(),
        }
        .into();
        assert!(!err.is_callback());
        assert!(err.to_string().contains("person"));
    }
}
