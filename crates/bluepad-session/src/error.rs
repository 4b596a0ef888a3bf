//! Error types for the session driver.

use bluepad_hid_ds4_protocol::Ds4ProtocolError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by [`crate::Ds4Session`] and its configuration layer.
///
/// Rumble and tick never return these; transport failures on those paths are
/// logged and counted instead.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// An incoming report could not be decoded.
    #[error("Input report rejected: {0}")]
    Decode(#[from] Ds4ProtocolError),

    /// The transport refused a command.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl SessionError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Create a configuration parse error.
    #[must_use]
    pub fn config_parse(reason: impl Into<String>) -> Self {
        Self::ConfigParse(reason.into())
    }
}

/// A specialized `Result` type for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::from(Ds4ProtocolError::TooShort { got: 10, need: 87 });
        assert_eq!(
            err.to_string(),
            "Input report rejected: report too short: got 10 bytes, need 87"
        );

        let err = SessionError::from(TransportError::Disconnected);
        assert!(err.to_string().contains("disconnected"));
    }

    #[test]
    fn test_error_constructors() {
        let err = SessionError::invalid_config("brightness");
        assert!(matches!(err, SessionError::InvalidConfig(_)));

        let err = SessionError::config_parse("eof");
        assert!(matches!(err, SessionError::ConfigParse(_)));
    }
}
