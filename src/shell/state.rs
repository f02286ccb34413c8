//! Shell state machine
//!
//! The shell is a reducer: hosts feed it [`ShellEvent`]s and execute the
//! [`Effect`]s it returns, reporting outcomes back as further events.
//! Everything the views render is derived from the session, the active
//! notice and the feed.
//!
//! ```text
//! Mounted ─► ProbeSession ─► SessionProbed(Connected) ─► OpenFeed ─► FeedFetched
//!                                                              └──► LiveRecords ...
//! ```

use std::time::Duration;

use alloy_primitives::Address;

use super::composer::Composer;
use super::notice::{NoticeBoard, NoticeToken, TransientNotice};
use crate::contract::Receipt;
use crate::error::PortalError;
use crate::feed::{FeedState, WaveRecord};
use crate::wallet::SessionState;

const LABEL_PROBING: &str = "Connecting to wallet...";
const LABEL_CONNECTING: &str = "Connecting wallet...";
const LABEL_LOADING: &str = "Loading waves...";
const LABEL_WAVING: &str = "Waving...";

/// Inputs to the shell
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// The view was mounted
    Mounted,
    /// Result of the silent account probe
    SessionProbed(Result<SessionState, PortalError>),
    /// The user pressed connect
    ConnectRequested,
    /// The wallet answered the connection prompt
    ConnectionResolved(Result<SessionState, PortalError>),
    /// The wallet reported a new account list
    AccountsChanged(SessionState),
    /// Historical batch for the feed opened as `epoch`
    FeedFetched {
        epoch: u64,
        result: Result<Vec<WaveRecord>, PortalError>,
    },
    /// Live records for the feed opened as `epoch`
    LiveRecords { epoch: u64, records: Vec<WaveRecord> },
    /// The compose box changed
    ComposeInput(String),
    /// The user pressed wave
    SubmitRequested,
    /// The wave transaction finished
    SubmitResolved(Result<Receipt, PortalError>),
    /// The timer for an error banner fired
    NoticeExpired(NoticeToken),
    /// The view is going away
    Unmounted,
}

/// Work the host must perform
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Look for an authorized account without prompting
    ProbeSession,
    /// Register the single accounts-changed listener for this mount
    WatchAccounts,
    /// Drop the accounts-changed listener
    ReleaseAccounts,
    /// Prompt the wallet for an account
    RequestConnection,
    /// Subscribe to new waves, then fetch history, tagging results with `epoch`
    OpenFeed { epoch: u64, account: Address },
    /// Cancel the subscription opened as `epoch`
    CloseFeed { epoch: u64 },
    /// Send a wave from `account`
    SubmitWave { account: Address, message: String },
    /// Deliver `NoticeExpired(token)` after `after`
    ExpireNotice { token: NoticeToken, after: Duration },
}

/// The single panel the view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Error(String),
    Progress(String),
    ConnectPrompt { wallet_available: bool },
    Composer,
}

/// Everything the shell knows
#[derive(Debug, Clone, PartialEq)]
pub struct ShellState {
    session: SessionState,
    notices: NoticeBoard,
    feed: FeedState,
    composer: Composer,
    notice_timeout: Duration,
    /// Epoch of the open feed, if any
    feed_epoch: Option<u64>,
    epochs_issued: u64,
    /// Loading notices for operations still in flight
    probing: Option<NoticeToken>,
    connecting: Option<NoticeToken>,
    fetching: Option<NoticeToken>,
    submitting: Option<NoticeToken>,
    mounted: bool,
}

impl ShellState {
    pub fn new(notice_timeout: Duration) -> Self {
        Self {
            session: SessionState::Disconnected,
            notices: NoticeBoard::new(),
            feed: FeedState::new(),
            composer: Composer::default(),
            notice_timeout,
            feed_epoch: None,
            epochs_issued: 0,
            probing: None,
            connecting: None,
            fetching: None,
            submitting: None,
            mounted: false,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn notice(&self) -> Option<&TransientNotice> {
        self.notices.current()
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn records(&self) -> &[WaveRecord] {
        self.feed.records()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn feed_epoch(&self) -> Option<u64> {
        self.feed_epoch
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        self.session.is_connected()
            && self.submitting.is_none()
            && self.composer.can_submit(self.notices.is_active())
    }

    /// Records to display: the feed shares the composer's panel
    pub fn visible_records(&self) -> &[WaveRecord] {
        if self.panel() == Panel::Composer {
            self.feed.records()
        } else {
            &[]
        }
    }

    /// Panel by priority: error, progress, connect prompt, composer
    pub fn panel(&self) -> Panel {
        match self.notices.current() {
            Some(TransientNotice::Error(message)) => Panel::Error(message.clone()),
            Some(TransientNotice::Loading(label)) => Panel::Progress(label.clone()),
            None => match self.session {
                SessionState::Connected(_) => Panel::Composer,
                other => Panel::ConnectPrompt {
                    wallet_available: other != SessionState::NoProvider,
                },
            },
        }
    }

    /// Apply one event and return the effects to run
    pub fn apply(&mut self, event: ShellEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            ShellEvent::Mounted => {
                if !self.mounted {
                    self.mounted = true;
                    self.session = SessionState::Connecting;
                    self.probing = Some(self.notices.loading(LABEL_PROBING));
                    effects.push(Effect::ProbeSession);
                }
            }

            ShellEvent::SessionProbed(result) => {
                let token = self.probing.take();
                self.finish_loading(token);
                match result {
                    Ok(SessionState::NoProvider) => {
                        self.session = SessionState::NoProvider;
                        self.show_error(&PortalError::EnvironmentMissing, &mut effects);
                    }
                    Ok(state) => {
                        effects.push(Effect::WatchAccounts);
                        self.set_session(state, &mut effects);
                    }
                    Err(e) => {
                        effects.push(Effect::WatchAccounts);
                        self.set_session(SessionState::Disconnected, &mut effects);
                        self.show_error(&e, &mut effects);
                    }
                }
            }

            ShellEvent::ConnectRequested => {
                if self.session == SessionState::NoProvider {
                    self.show_error(&PortalError::EnvironmentMissing, &mut effects);
                } else if !self.session.is_connected() && self.connecting.is_none() {
                    self.session = SessionState::Connecting;
                    self.connecting = Some(self.notices.loading(LABEL_CONNECTING));
                    effects.push(Effect::RequestConnection);
                }
            }

            ShellEvent::ConnectionResolved(result) => {
                let token = self.connecting.take();
                self.finish_loading(token);
                match result {
                    Ok(state) => self.set_session(state, &mut effects),
                    Err(e) => {
                        if self.session == SessionState::Connecting {
                            self.session = SessionState::Disconnected;
                        }
                        self.show_error(&e, &mut effects);
                    }
                }
            }

            ShellEvent::AccountsChanged(state) => {
                if self.session != SessionState::NoProvider {
                    self.set_session(state, &mut effects);
                }
            }

            ShellEvent::FeedFetched { epoch, result } => {
                if self.feed_epoch != Some(epoch) {
                    tracing::debug!(epoch, "Dropping history for a closed feed");
                    return effects;
                }
                let token = self.fetching.take();
                self.finish_loading(token);
                match result {
                    Ok(records) => self.feed.initialize(records),
                    Err(e) => {
                        // No live-only feed: drop the subscription with the history.
                        self.feed_epoch = None;
                        self.feed.reset();
                        effects.push(Effect::CloseFeed { epoch });
                        self.show_error(&e, &mut effects);
                    }
                }
            }

            ShellEvent::LiveRecords { epoch, records } => {
                if self.feed_epoch != Some(epoch) {
                    tracing::debug!(epoch, "Dropping live records for a closed feed");
                    return effects;
                }
                for record in records {
                    self.feed.append(record);
                }
            }

            ShellEvent::ComposeInput(text) => self.composer.set_text(text),

            ShellEvent::SubmitRequested => {
                if !self.can_submit() {
                    return effects;
                }
                let (Some(account), Some(message)) =
                    (self.session.account(), self.composer.message())
                else {
                    return effects;
                };
                effects.push(Effect::SubmitWave {
                    account,
                    message: message.to_string(),
                });
                self.submitting = Some(self.notices.loading(LABEL_WAVING));
            }

            ShellEvent::SubmitResolved(result) => {
                let token = self.submitting.take();
                self.finish_loading(token);
                self.composer.clear();
                if let Err(e) = result {
                    if e.revokes_session() {
                        self.set_session(SessionState::Disconnected, &mut effects);
                    }
                    self.show_error(&e, &mut effects);
                }
            }

            ShellEvent::NoticeExpired(token) => {
                if self.notices.expire(token) {
                    self.restore_progress();
                }
            }

            ShellEvent::Unmounted => {
                if let Some(epoch) = self.feed_epoch.take() {
                    effects.push(Effect::CloseFeed { epoch });
                }
                effects.push(Effect::ReleaseAccounts);
                self.feed.reset();
                self.notices.clear();
                self.composer.clear();
                self.probing = None;
                self.connecting = None;
                self.fetching = None;
                self.submitting = None;
                self.mounted = false;
            }
        }

        effects
    }

    /// Move to `state`, re-opening the feed when the account changes
    fn set_session(&mut self, state: SessionState, effects: &mut Vec<Effect>) {
        let previous = self.session.account();
        self.session = state;

        if previous == state.account() && (self.feed_epoch.is_some() || previous.is_none()) {
            return;
        }

        if let Some(epoch) = self.feed_epoch.take() {
            effects.push(Effect::CloseFeed { epoch });
            self.feed.reset();
            let token = self.fetching.take();
            self.finish_loading(token);
        }

        if let Some(account) = state.account() {
            self.epochs_issued += 1;
            let epoch = self.epochs_issued;
            self.feed_epoch = Some(epoch);
            self.fetching = Some(self.notices.loading(LABEL_LOADING));
            effects.push(Effect::OpenFeed { epoch, account });
        }
    }

    /// Finish one operation's label, then show whatever is still running
    fn finish_loading(&mut self, token: Option<NoticeToken>) {
        if let Some(token) = token {
            self.notices.finish(token);
        }
        self.restore_progress();
    }

    /// Only one notice fits; a newer one may have replaced a running label.
    fn restore_progress(&mut self) {
        if self.notices.is_active() {
            return;
        }
        if self.submitting.is_some() {
            self.submitting = Some(self.notices.loading(LABEL_WAVING));
        } else if self.fetching.is_some() {
            self.fetching = Some(self.notices.loading(LABEL_LOADING));
        } else if self.connecting.is_some() {
            self.connecting = Some(self.notices.loading(LABEL_CONNECTING));
        } else if self.probing.is_some() {
            self.probing = Some(self.notices.loading(LABEL_PROBING));
        }
    }

    fn show_error(&mut self, error: &PortalError, effects: &mut Vec<Effect>) {
        tracing::warn!(error = %error, "Showing error notice");
        let token = self.notices.error(error.to_string());
        effects.push(Effect::ExpireNotice {
            token,
            after: self.notice_timeout,
        });
    }
}
