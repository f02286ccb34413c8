//! Portal error taxonomy
//!
//! The errors the shell turns into banners. None of them is fatal: each one
//! degrades to a visible, recoverable state.

use thiserror::Error;

use crate::contract::{GatewayError, WriteFailureKind};

/// Errors surfaced to the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortalError {
    /// No wallet is installed
    #[error("No Ethereum wallet found. Install MetaMask to wave.")]
    EnvironmentMissing,

    /// The user declined to connect an account
    #[error("Wallet connection was rejected")]
    ConnectionRejected,

    /// Loading accounts or waves failed
    #[error("Could not load waves: {0}")]
    ReadFailure(String),

    /// Sending a wave failed
    #[error("{message}")]
    WriteFailure {
        kind: WriteFailureKind,
        message: String,
    },

    /// Anything else the wallet reported
    #[error("An error occurred: {0}")]
    Unknown(String),
}

impl PortalError {
    /// Whether this failure means the active account can no longer be used
    pub fn revokes_session(&self) -> bool {
        matches!(
            self,
            PortalError::WriteFailure {
                kind: WriteFailureKind::Unauthorized,
                ..
            }
        )
    }
}

impl From<GatewayError> for PortalError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Read(message) => PortalError::ReadFailure(message),
            GatewayError::Decode(message) => PortalError::ReadFailure(message),
            GatewayError::Write { kind, message } => PortalError::WriteFailure { kind, message },
        }
    }
}

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PortalError::ConnectionRejected.to_string(),
            "Wallet connection was rejected"
        );
        let err = PortalError::WriteFailure {
            kind: WriteFailureKind::OutOfGas,
            message: "intrinsic gas too low".to_string(),
        };
        assert_eq!(err.to_string(), "intrinsic gas too low");
    }

    #[test]
    fn test_only_authorization_loss_revokes() {
        let unauthorized: PortalError = GatewayError::Write {
            kind: WriteFailureKind::Unauthorized,
            message: "locked".to_string(),
        }
        .into();
        assert!(unauthorized.revokes_session());

        let rejected: PortalError = GatewayError::Write {
            kind: WriteFailureKind::Rejected,
            message: "denied".to_string(),
        }
        .into();
        assert!(!rejected.revokes_session());
        assert!(!PortalError::ReadFailure("down".into()).revokes_session());
    }

    #[test]
    fn test_gateway_conversion() {
        let err: PortalError = GatewayError::Read("timeout".into()).into();
        assert!(matches!(err, PortalError::ReadFailure(ref m) if m == "timeout"));
    }
}
