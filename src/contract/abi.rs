//! WavePortal contract interface
//!
//! Bindings for the deployed contract's ABI:
//!
//! ```text
//! struct Wave { address waver; string message; uint256 timestamp; }
//! function wave(string _message)
//! function getAllWaves() view returns (Wave[])
//! event NewWave(address indexed from, uint256 timestamp, string message)
//! ```

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};

use super::error::{GatewayError, GatewayResult};
use crate::feed::RawWave;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct Wave {
        address waver;
        string message;
        uint256 timestamp;
    }

    #[derive(Debug, PartialEq, Eq)]
    event NewWave(address indexed from, uint256 timestamp, string message);

    function wave(string _message) external;

    function getAllWaves() external view returns (Wave[] memory);
}

/// Calldata for `getAllWaves()`
pub fn encode_get_all_waves() -> Vec<u8> {
    getAllWavesCall {}.abi_encode()
}

/// Decode the return data of `getAllWaves()`
pub fn decode_all_waves(data: &[u8]) -> GatewayResult<Vec<RawWave>> {
    let decoded = getAllWavesCall::abi_decode_returns(data, true)
        .map_err(|e| GatewayError::Decode(format!("getAllWaves: {e}")))?;
    Ok(decoded._0.into_iter().map(RawWave::from).collect())
}

/// Calldata for `wave(message)`
pub fn encode_wave(message: &str) -> Vec<u8> {
    waveCall {
        _message: message.to_string(),
    }
    .abi_encode()
}

/// Topic0 of the `NewWave` event
pub fn new_wave_topic() -> B256 {
    NewWave::SIGNATURE_HASH
}

/// Decode one `NewWave` log
pub fn decode_new_wave(topics: &[B256], data: &[u8]) -> GatewayResult<RawWave> {
    let event = NewWave::decode_raw_log(topics.iter().copied(), data, true)
        .map_err(|e| GatewayError::Decode(format!("NewWave: {e}")))?;
    Ok(raw_wave(event.from, event.timestamp, event.message))
}

impl From<Wave> for RawWave {
    fn from(wave: Wave) -> Self {
        raw_wave(wave.waver, wave.timestamp, wave.message)
    }
}

fn raw_wave(sender: Address, timestamp: U256, message: String) -> RawWave {
    RawWave {
        // An all-zero slot means the tuple was never populated.
        sender: (sender != Address::ZERO).then_some(sender),
        timestamp: u64::try_from(timestamp).ok(),
        message: Some(message),
    }
}
