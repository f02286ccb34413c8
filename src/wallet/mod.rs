//! Wallet
//!
//! - **provider**: the `Provider` trait every wallet or node implements
//! - **session**: `WalletSession`, probing and requesting accounts
//! - **http**: JSON-RPC provider for the terminal hosts

pub mod provider;
pub mod session;

#[cfg(feature = "native")]
pub mod http;

#[cfg(test)]
pub(crate) mod mock;

pub use provider::{AccountsListener, Provider, ProviderError};
pub use session::{SessionState, WalletSession};

#[cfg(feature = "native")]
pub use http::HttpProvider;
