//! WavePortal Contract
//!
//! - **abi**: contract bindings and codecs
//! - **gateway**: `ContractGateway` / `ContractHandle` for reads, writes and log filters
//! - **error**: `GatewayError` and the write-failure classification

pub mod abi;
pub mod error;
pub mod gateway;

pub use error::{GatewayError, GatewayResult, WriteFailureKind};
pub use gateway::{ContractGateway, ContractHandle, Receipt, WaveSubscription};
