//! UI Shell
//!
//! Host-independent view logic shared by the browser and terminal front-ends:
//!
//! - **state**: `ShellState`, the reducer over session, notices and feed
//! - **notice**: `NoticeBoard` holding the single loading/error notice
//! - **composer**: the pending wave text
//! - **format**: absolute and relative timestamps for feed entries
//!
//! # Panels
//!
//! Exactly one panel is shown, picked by priority:
//!
//! ```text
//! Error banner > Progress indicator > Connect prompt > Composer + feed
//! ```

pub mod composer;
pub mod format;
pub mod notice;
pub mod state;

pub use composer::Composer;
pub use notice::{NoticeBoard, NoticeToken, TransientNotice};
pub use state::{Effect, Panel, ShellEvent, ShellState};
