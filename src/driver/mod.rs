//! Effect Driver
//!
//! Executes the [`Effect`]s produced by the shell against a wallet provider
//! and reports outcomes through a sink as [`ShellEvent`]s. The driver owns
//! the long-lived registrations (accounts listener, log filter) so they are
//! released deterministically when the shell closes the feed or unmounts.
//!
//! Effects may run concurrently on one thread; the driver never holds a
//! borrow of its own state across an await.

pub mod timer;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use alloy_primitives::Address;

use crate::config::ContractConfig;
use crate::contract::{ContractGateway, ContractHandle, WaveSubscription};
use crate::error::PortalError;
use crate::shell::{Effect, ShellEvent};
use crate::wallet::{AccountsListener, Provider, WalletSession};

pub use timer::Timer;
#[cfg(feature = "native")]
pub use timer::TokioTimer;

/// The feed currently open, with its live subscription
struct LiveFeed<P> {
    epoch: u64,
    handle: ContractHandle<P>,
    subscription: Option<WaveSubscription>,
}

/// Runs shell effects for one mounted view
pub struct Driver<P> {
    session: WalletSession<P>,
    gateway: Option<ContractGateway<P>>,
    timer: Rc<dyn Timer>,
    sink: Rc<dyn Fn(ShellEvent)>,
    /// Epoch the shell most recently asked to open and has not closed
    active_epoch: Cell<Option<u64>>,
    feed: RefCell<Option<LiveFeed<P>>>,
    accounts: RefCell<Option<AccountsListener>>,
}

impl<P: Provider + Clone + 'static> Driver<P> {
    /// `provider` is `None` when the environment has no wallet
    pub fn new(
        provider: Option<P>,
        timer: Rc<dyn Timer>,
        contract: ContractConfig,
        sink: impl Fn(ShellEvent) + 'static,
    ) -> Self {
        let gateway = provider
            .clone()
            .map(|p| ContractGateway::new(p, Rc::clone(&timer), contract));

        Self {
            session: WalletSession::new(provider),
            gateway,
            timer,
            sink: Rc::new(sink),
            active_epoch: Cell::new(None),
            feed: RefCell::new(None),
            accounts: RefCell::new(None),
        }
    }

    fn emit(&self, event: ShellEvent) {
        (self.sink)(event);
    }

    /// Whether a live subscription is installed
    pub fn has_live_feed(&self) -> bool {
        self.feed
            .borrow()
            .as_ref()
            .is_some_and(|feed| feed.subscription.is_some())
    }

    /// Execute one effect to completion
    pub async fn run(&self, effect: Effect) {
        match effect {
            Effect::ProbeSession => {
                let result = self.session.probe_existing_session().await;
                self.emit(ShellEvent::SessionProbed(result));
            }

            Effect::WatchAccounts => {
                if self.accounts.borrow().is_some() {
                    return;
                }
                let sink = Rc::clone(&self.sink);
                let listener = self
                    .session
                    .on_accounts_changed(move |state| sink(ShellEvent::AccountsChanged(state)));
                *self.accounts.borrow_mut() = listener;
            }

            Effect::ReleaseAccounts => {
                if let Some(listener) = self.accounts.borrow_mut().take() {
                    listener.release();
                    tracing::debug!("Released accounts listener");
                }
            }

            Effect::RequestConnection => {
                let result = self.session.request_connection().await;
                self.emit(ShellEvent::ConnectionResolved(result));
            }

            Effect::OpenFeed { epoch, account } => self.open_feed(epoch, account).await,

            Effect::CloseFeed { epoch } => self.close_feed(epoch).await,

            Effect::SubmitWave { account, message } => {
                let result = match &self.gateway {
                    Some(gateway) => gateway
                        .open(account)
                        .submit_wave(&message)
                        .await
                        .map_err(PortalError::from),
                    None => Err(PortalError::EnvironmentMissing),
                };
                self.emit(ShellEvent::SubmitResolved(result));
            }

            Effect::ExpireNotice { token, after } => {
                self.timer.sleep(after).await;
                self.emit(ShellEvent::NoticeExpired(token));
            }
        }
    }

    async fn open_feed(&self, epoch: u64, account: Address) {
        let Some(gateway) = &self.gateway else {
            self.emit(ShellEvent::FeedFetched {
                epoch,
                result: Err(PortalError::EnvironmentMissing),
            });
            return;
        };
        self.active_epoch.set(Some(epoch));

        let handle = gateway.open(account);

        // Subscribe before fetching so nothing emitted in between is missed;
        // the reconciler drops the overlap.
        let subscription = match handle.subscribe_new_records().await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!(epoch, error = %e, "Live updates unavailable");
                None
            }
        };

        if self.active_epoch.get() != Some(epoch) {
            tracing::debug!(epoch, "Feed closed while subscribing");
            if let Some(subscription) = subscription {
                release_subscription(&handle, subscription).await;
            }
            return;
        }

        let previous = self.feed.borrow_mut().replace(LiveFeed {
            epoch,
            handle: handle.clone(),
            subscription,
        });
        if let Some(LiveFeed {
            handle,
            subscription: Some(subscription),
            ..
        }) = previous
        {
            release_subscription(&handle, subscription).await;
        }

        let result = handle
            .fetch_all_records()
            .await
            .map_err(PortalError::from);
        self.emit(ShellEvent::FeedFetched { epoch, result });
    }

    async fn close_feed(&self, epoch: u64) {
        if self.active_epoch.get() == Some(epoch) {
            self.active_epoch.set(None);
        }

        let closing = {
            let mut feed = self.feed.borrow_mut();
            match feed.as_ref() {
                Some(open) if open.epoch == epoch => feed.take(),
                _ => None,
            }
        };

        if let Some(LiveFeed {
            handle,
            subscription: Some(subscription),
            ..
        }) = closing
        {
            release_subscription(&handle, subscription).await;
        }
    }

    /// Poll the live subscription once and forward any new records
    pub async fn poll_live(&self) {
        let current = self.feed.borrow().as_ref().and_then(|feed| {
            feed.subscription
                .clone()
                .map(|subscription| (feed.epoch, feed.handle.clone(), subscription))
        });
        let Some((epoch, handle, subscription)) = current else {
            return;
        };

        match handle.poll_subscription(&subscription).await {
            Ok(records) if !records.is_empty() => {
                tracing::debug!(epoch, count = records.len(), "New waves");
                self.emit(ShellEvent::LiveRecords { epoch, records });
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(epoch, error = %e, "Polling for new waves failed"),
        }
    }
}

async fn release_subscription<P: Provider>(
    handle: &ContractHandle<P>,
    subscription: WaveSubscription,
) {
    if let Err(e) = handle.unsubscribe(subscription).await {
        tracing::warn!(error = %e, "Failed to uninstall wave filter");
    }
}
