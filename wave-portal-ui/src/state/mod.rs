//! State Management
//!
//! The shell state machine in a signal, wired to the effect driver.

pub mod portal;

pub use portal::{provide_portal_state, PortalState};
