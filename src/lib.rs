//! # Wave Portal
//!
//! Client for the WavePortal contract: connect a wallet, read every wave ever
//! sent, send new ones and watch the feed update live.
//!
//! ## Features
//!
//! - **Wallet sessions**: silent probe, explicit connect and account tracking
//!   over any EIP-1193 style provider
//! - **Typed contract access**: `getAllWaves`, `wave` and the `NewWave` log
//! - **Live feed**: history and live events merged newest first, without
//!   duplicates, whichever arrives first
//! - **Host-neutral shell**: a pure state machine shared by the browser and
//!   terminal front ends
//!
//! ## Modules
//!
//! - [`wallet`]: Provider abstraction and session state
//! - [`contract`]: Contract gateway and ABI bindings
//! - [`feed`]: Wave records and the feed reconciler
//! - [`shell`]: View state machine, notices and formatting
//! - [`driver`]: Executes shell effects against a provider
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use std::time::Duration;
//! use wave_portal::driver::{Driver, TokioTimer};
//! use wave_portal::shell::{ShellEvent, ShellState};
//! use wave_portal::{Config, HttpProvider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_default();
//! let provider = HttpProvider::new(&config.rpc.url, config.rpc.request_timeout())?;
//!
//! let driver = Driver::new(
//!     Some(provider),
//!     Rc::new(TokioTimer),
//!     config.contract.clone(),
//!     |event| println!("{event:?}"),
//! );
//!
//! let mut shell = ShellState::new(config.ui.notice_timeout());
//! for effect in shell.apply(ShellEvent::Mounted) {
//!     driver.run(effect).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contract;
pub mod driver;
pub mod error;
pub mod feed;
#[cfg(feature = "native")]
pub mod logging;
pub mod shell;
pub mod wallet;

// Re-export top-level types for convenience
pub use config::{Config, ContractConfig, LoggingConfig, RpcConfig, UiConfig};

#[cfg(feature = "native")]
pub use config::ConfigError;

pub use contract::{
    ContractGateway, ContractHandle, GatewayError, GatewayResult, Receipt, WaveSubscription,
    WriteFailureKind,
};

pub use driver::{Driver, Timer};

pub use error::{PortalError, PortalResult};

pub use feed::{FeedState, RawWave, RecordKey, WaveRecord};

pub use shell::{Effect, Panel, ShellEvent, ShellState, TransientNotice};

pub use wallet::{AccountsListener, Provider, ProviderError, SessionState, WalletSession};

#[cfg(feature = "native")]
pub use wallet::HttpProvider;
