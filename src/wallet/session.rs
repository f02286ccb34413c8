//! Wallet Session Manager
//!
//! Detects the wallet provider, discovers or requests the active account and
//! turns account-change notifications into [`SessionState`] transitions.

use std::fmt;

use alloy_primitives::Address;
use serde_json::json;

use super::provider::{
    parse_accounts, AccountsListener, Provider, ProviderError, CODE_METHOD_NOT_FOUND,
};
use crate::error::PortalError;

/// Where the wallet session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No wallet environment is present
    NoProvider,
    /// A wallet exists but no account is authorized
    Disconnected,
    /// Waiting on the wallet to answer
    Connecting,
    /// Authorized with this account
    Connected(Address),
}

impl SessionState {
    /// Map an account list to a state; the first account is the active one
    pub fn from_accounts(accounts: &[Address]) -> Self {
        match accounts.first() {
            Some(account) => SessionState::Connected(*account),
            None => SessionState::Disconnected,
        }
    }

    pub fn account(&self) -> Option<Address> {
        match self {
            SessionState::Connected(account) => Some(*account),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NoProvider => write!(f, "no wallet"),
            SessionState::Disconnected => write!(f, "disconnected"),
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Connected(account) => write!(f, "connected as {account}"),
        }
    }
}

/// Wallet session over an optional provider
///
/// `None` means the environment has no wallet at all.
pub struct WalletSession<P> {
    provider: Option<P>,
}

impl<P: Provider> WalletSession<P> {
    pub fn new(provider: Option<P>) -> Self {
        if provider.is_none() {
            tracing::warn!("No wallet provider detected");
        }
        Self { provider }
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Look for an already-authorized account without prompting
    ///
    /// A missing provider is reported as `Ok(NoProvider)`, not as an error.
    pub async fn probe_existing_session(&self) -> Result<SessionState, PortalError> {
        let Some(provider) = &self.provider else {
            return Ok(SessionState::NoProvider);
        };

        let accounts = provider
            .request("eth_accounts", json!([]))
            .await
            .and_then(|value| parse_accounts(&value))
            .map_err(|e| {
                tracing::error!(error = %e, "Account discovery failed");
                PortalError::ReadFailure(e.to_string())
            })?;

        let state = SessionState::from_accounts(&accounts);
        tracing::info!(%state, "Probed existing session");
        Ok(state)
    }

    /// Ask the wallet to authorize an account
    ///
    /// Suspends until the user answers. Plain nodes that do not implement the
    /// prompt fall back to their unlocked accounts.
    pub async fn request_connection(&self) -> Result<SessionState, PortalError> {
        let Some(provider) = &self.provider else {
            return Err(PortalError::EnvironmentMissing);
        };

        let reply = match provider.request("eth_requestAccounts", json!([])).await {
            Err(e) if e.code() == Some(CODE_METHOD_NOT_FOUND) => {
                tracing::debug!("eth_requestAccounts unsupported, using eth_accounts");
                provider.request("eth_accounts", json!([])).await
            }
            other => other,
        };

        let accounts = reply
            .and_then(|value| parse_accounts(&value))
            .map_err(connection_error)?;

        let state = SessionState::from_accounts(&accounts);
        tracing::info!(%state, "Connection request resolved");
        Ok(state)
    }

    /// Subscribe to account changes
    ///
    /// Returns `None` when there is no provider to listen to.
    pub fn on_accounts_changed(
        &self,
        handler: impl Fn(SessionState) + 'static,
    ) -> Option<AccountsListener> {
        let provider = self.provider.as_ref()?;
        Some(provider.on_accounts_changed(Box::new(move |accounts| {
            let state = SessionState::from_accounts(&accounts);
            tracing::info!(%state, "Wallet accounts changed");
            handler(state);
        })))
    }
}

fn connection_error(e: ProviderError) -> PortalError {
    if e.is_user_rejection() {
        tracing::info!("User rejected the connection request");
        PortalError::ConnectionRejected
    } else {
        tracing::error!(error = %e, "Connection request failed");
        PortalError::Unknown(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::mock::MockProvider;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn account(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn test_probe_without_provider() {
        let session: WalletSession<MockProvider> = WalletSession::new(None);
        assert_eq!(
            session.probe_existing_session().await.unwrap(),
            SessionState::NoProvider
        );
    }

    #[tokio::test]
    async fn test_probe_finds_authorized_account() {
        let provider = MockProvider::new().with_accounts(vec![account(0xab)]);
        let session = WalletSession::new(Some(provider.clone()));

        let state = session.probe_existing_session().await.unwrap();
        assert_eq!(state, SessionState::Connected(account(0xab)));
        assert_eq!(provider.calls("eth_requestAccounts"), 0);
    }

    #[tokio::test]
    async fn test_probe_without_accounts_is_disconnected() {
        let session = WalletSession::new(Some(MockProvider::new()));
        assert_eq!(
            session.probe_existing_session().await.unwrap(),
            SessionState::Disconnected
        );
    }

    #[tokio::test]
    async fn test_request_connection_rejected() {
        let provider = MockProvider::new();
        provider.fail("eth_requestAccounts", ProviderError::rpc(4001, "User rejected"));
        let session = WalletSession::new(Some(provider));

        let err = session.request_connection().await.unwrap_err();
        assert!(matches!(err, PortalError::ConnectionRejected));
    }

    #[tokio::test]
    async fn test_request_connection_without_provider() {
        let session: WalletSession<MockProvider> = WalletSession::new(None);
        let err = session.request_connection().await.unwrap_err();
        assert!(matches!(err, PortalError::EnvironmentMissing));
    }

    #[tokio::test]
    async fn test_request_connection_falls_back_for_nodes() {
        let provider = MockProvider::new().with_accounts(vec![account(0x01)]);
        provider.fail(
            "eth_requestAccounts",
            ProviderError::rpc(CODE_METHOD_NOT_FOUND, "method not found"),
        );
        let session = WalletSession::new(Some(provider));

        let state = session.request_connection().await.unwrap();
        assert_eq!(state, SessionState::Connected(account(0x01)));
    }

    #[test]
    fn test_accounts_changed_handles_empty_list() {
        let provider = MockProvider::new();
        let session = WalletSession::new(Some(provider.clone()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let listener = session
            .on_accounts_changed(move |state| sink.borrow_mut().push(state))
            .unwrap();

        provider.emit_accounts(vec![account(0x02), account(0x03)]);
        provider.emit_accounts(vec![]);
        assert_eq!(
            *seen.borrow(),
            vec![SessionState::Connected(account(0x02)), SessionState::Disconnected]
        );

        drop(listener);
        assert_eq!(provider.listener_count(), 0);
        provider.emit_accounts(vec![account(0x04)]);
        assert_eq!(seen.borrow().len(), 2);
    }
}
