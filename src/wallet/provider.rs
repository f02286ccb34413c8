//! Wallet provider abstraction
//!
//! A provider is anything that answers EIP-1193 style requests: the injected
//! browser wallet, or a JSON-RPC node over HTTP. Requests carry JSON params and
//! resolve to JSON results; rejections carry the EIP-1193 / JSON-RPC code.

use std::fmt;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// User rejected the request
pub const CODE_USER_REJECTED: i64 = 4001;
/// The requested account or method has not been authorized
pub const CODE_UNAUTHORIZED: i64 = 4100;
/// The provider is disconnected from all chains
pub const CODE_DISCONNECTED: i64 = 4900;
/// The provider is disconnected from the requested chain
pub const CODE_CHAIN_DISCONNECTED: i64 = 4901;
/// JSON-RPC: method does not exist
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;

/// Errors returned by a wallet provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider answered with an error object
    #[error("{message} (code {code})")]
    Rpc {
        code: i64,
        message: String,
        /// Nested reason some wallets attach (`error.data.message`, revert text)
        reason: Option<String>,
    },

    /// The request never reached the provider or the reply was lost
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider replied with something we could not interpret
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        ProviderError::Rpc {
            code,
            message: message.into(),
            reason: None,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            ProviderError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(CODE_USER_REJECTED)
    }

    /// The account is no longer usable (revoked, locked, or wallet disconnected)
    pub fn is_authorization_loss(&self) -> bool {
        matches!(
            self.code(),
            Some(CODE_UNAUTHORIZED | CODE_DISCONNECTED | CODE_CHAIN_DISCONNECTED)
        )
    }

    /// The structured reason attached to the error, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            ProviderError::Rpc {
                reason: Some(reason),
                ..
            } => Some(reason),
            _ => None,
        }
    }
}

/// An EIP-1193 compatible wallet or node
///
/// Futures are not `Send`: both hosts run a single-threaded event loop.
#[async_trait(?Send)]
pub trait Provider {
    /// Send one request and wait for its result
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Register for account changes; the listener deregisters when dropped
    fn on_accounts_changed(&self, handler: Box<dyn Fn(Vec<Address>)>) -> AccountsListener;
}

/// Registration handle for an `accountsChanged` listener
///
/// Dropping the handle removes the listener.
pub struct AccountsListener {
    release: Option<Box<dyn FnOnce()>>,
}

impl AccountsListener {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Deregister now
    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for AccountsListener {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for AccountsListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountsListener")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Parse a JSON array of account strings, skipping anything that is not an address
pub fn parse_accounts(value: &Value) -> Result<Vec<Address>, ProviderError> {
    let items = value
        .as_array()
        .ok_or_else(|| ProviderError::Malformed(format!("expected account list, got {value}")))?;

    Ok(items
        .iter()
        .filter_map(|item| item.as_str())
        .filter_map(|s| match s.parse::<Address>() {
            Ok(address) => Some(address),
            Err(e) => {
                tracing::warn!(account = %s, error = %e, "Ignoring unparseable account");
                None
            }
        })
        .collect())
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_quantity(value: &Value) -> Result<u64, ProviderError> {
    let s = value
        .as_str()
        .ok_or_else(|| ProviderError::Malformed(format!("expected hex quantity, got {value}")))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| ProviderError::Malformed(format!("bad quantity {s}: {e}")))
}

/// Format a `0x`-prefixed hex quantity
pub fn format_quantity(value: u64) -> String {
    format!("0x{value:x}")
}
