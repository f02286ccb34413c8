//! UI Components
//!
//! One component per panel, plus the wave feed.

pub mod composer;
pub mod connect;
pub mod feed;
pub mod loading;
pub mod panel;
pub mod toast;

pub use composer::Composer;
pub use connect::ConnectPrompt;
pub use feed::Feed;
pub use loading::Progress;
pub use panel::ActivePanel;
pub use toast::ErrorBanner;
