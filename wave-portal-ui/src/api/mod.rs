//! Browser wallet access
//!
//! Binds the injected `window.ethereum` object to the library's
//! [`Provider`](wave_portal::Provider) trait, plus a gloo-backed timer.

pub mod ethereum;
pub mod timer;

pub use ethereum::BrowserProvider;
pub use timer::GlooTimer;
