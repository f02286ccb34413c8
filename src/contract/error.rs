//! Contract gateway error types

use std::fmt;

use thiserror::Error;

use crate::wallet::ProviderError;

/// Why a wave transaction did not make it on chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureKind {
    /// The user declined to sign
    Rejected,
    /// The signer lost its authorization (revoked, locked, disconnected)
    Unauthorized,
    /// The gas ceiling was too low or the account could not pay for it
    OutOfGas,
    /// The contract reverted, or the receipt reports failure
    Reverted,
    /// The request or the receipt wait failed in transit
    Network,
}

impl WriteFailureKind {
    /// Classify a provider error raised while sending a transaction
    pub fn classify(error: &ProviderError) -> Self {
        if error.is_user_rejection() {
            return WriteFailureKind::Rejected;
        }
        if error.is_authorization_loss() {
            return WriteFailureKind::Unauthorized;
        }
        match error {
            ProviderError::Rpc {
                code,
                message,
                reason,
            } => {
                let text = format!(
                    "{} {}",
                    message.to_lowercase(),
                    reason.as_deref().unwrap_or_default().to_lowercase()
                );
                if text.contains("gas") || text.contains("insufficient funds") {
                    WriteFailureKind::OutOfGas
                } else if *code == 3 || text.contains("revert") {
                    WriteFailureKind::Reverted
                } else {
                    WriteFailureKind::Network
                }
            }
            ProviderError::Transport(_) | ProviderError::Malformed(_) => WriteFailureKind::Network,
        }
    }
}

impl fmt::Display for WriteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteFailureKind::Rejected => write!(f, "rejected"),
            WriteFailureKind::Unauthorized => write!(f, "unauthorized"),
            WriteFailureKind::OutOfGas => write!(f, "out of gas"),
            WriteFailureKind::Reverted => write!(f, "reverted"),
            WriteFailureKind::Network => write!(f, "network"),
        }
    }
}

/// Errors from contract reads and writes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// `getAllWaves` or a log poll failed
    #[error("Read failed: {0}")]
    Read(String),

    /// The wave transaction failed
    #[error("Wave failed ({kind}): {message}")]
    Write {
        kind: WriteFailureKind,
        message: String,
    },

    /// Returned bytes did not match the contract interface
    #[error("Could not decode contract data: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn read(error: ProviderError) -> Self {
        GatewayError::Read(error.to_string())
    }

    pub fn write(error: ProviderError) -> Self {
        let kind = WriteFailureKind::classify(&error);
        // Prefer the wallet's structured reason over its generic wrapper text.
        let message = match error.reason() {
            Some(reason) => reason.to_string(),
            None => match &error {
                ProviderError::Rpc { message, .. } => message.clone(),
                other => other.to_string(),
            },
        };
        GatewayError::Write { kind, message }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_write_failures() {
        let cases = [
            (ProviderError::rpc(4001, "User denied transaction signature"), WriteFailureKind::Rejected),
            (ProviderError::rpc(4100, "The requested account has not been authorized"), WriteFailureKind::Unauthorized),
            (ProviderError::rpc(-32000, "intrinsic gas too low"), WriteFailureKind::OutOfGas),
            (ProviderError::rpc(-32000, "insufficient funds for gas * price + value"), WriteFailureKind::OutOfGas),
            (ProviderError::rpc(3, "execution reverted"), WriteFailureKind::Reverted),
            (ProviderError::Transport("connection refused".into()), WriteFailureKind::Network),
        ];
        for (error, expected) in cases {
            assert_eq!(WriteFailureKind::classify(&error), expected, "{error}");
        }
    }

    #[test]
    fn test_write_prefers_reason() {
        let error = ProviderError::Rpc {
            code: -32603,
            message: "Internal JSON-RPC error.".to_string(),
            reason: Some("execution reverted: Wait 15m".to_string()),
        };
        match GatewayError::write(error) {
            GatewayError::Write { kind, message } => {
                assert_eq!(kind, WriteFailureKind::Reverted);
                assert_eq!(message, "execution reverted: Wait 15m");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
