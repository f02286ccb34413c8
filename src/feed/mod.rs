//! Wave Feed
//!
//! - **types**: `WaveRecord`, the optional-field `RawWave` and its total mapping
//! - **reconciler**: `FeedState`, merging the historical batch with live events
//!
//! ```text
//! getAllWaves() ──► initialize ─┐
//!                               ├──► FeedState (newest first, de-duplicated)
//! NewWave logs ───► append ─────┘
//! ```

pub mod reconciler;
pub mod types;

pub use reconciler::FeedState;
pub use types::{RawWave, RecordKey, WaveRecord};
