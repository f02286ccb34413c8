//! Contract Gateway
//!
//! Typed access to the deployed WavePortal contract through a wallet
//! provider: one read (`getAllWaves`), one write (`wave`) and a log filter on
//! `NewWave` for live updates.

use std::rc::Rc;
use std::time::Duration;

use alloy_primitives::{hex, Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::abi;
use super::error::{GatewayError, GatewayResult, WriteFailureKind};
use crate::config::ContractConfig;
use crate::driver::Timer;
use crate::feed::WaveRecord;
use crate::wallet::provider::{format_quantity, parse_quantity, Provider, ProviderError};

/// Factory for contract handles bound to a fixed address and interface
pub struct ContractGateway<P> {
    provider: P,
    timer: Rc<dyn Timer>,
    config: ContractConfig,
}

impl<P: Provider + Clone> ContractGateway<P> {
    pub fn new(provider: P, timer: Rc<dyn Timer>, config: ContractConfig) -> Self {
        if config.address == Address::ZERO {
            tracing::warn!("Contract address is not configured; calls will fail");
        }
        Self {
            provider,
            timer,
            config,
        }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Bind the contract to the signing account. No I/O.
    pub fn open(&self, account: Address) -> ContractHandle<P> {
        ContractHandle {
            provider: self.provider.clone(),
            timer: Rc::clone(&self.timer),
            contract: self.config.address,
            signer: account,
            gas_limit: self.config.gas_limit,
            poll_interval: self.config.poll_interval(),
        }
    }
}

/// Provider + signer + contract address, ready for calls
#[derive(Clone)]
pub struct ContractHandle<P> {
    provider: P,
    timer: Rc<dyn Timer>,
    contract: Address,
    signer: Address,
    gas_limit: u64,
    poll_interval: Duration,
}

/// An installed `NewWave` log filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveSubscription {
    filter_id: String,
}

impl WaveSubscription {
    pub fn filter_id(&self) -> &str {
        &self.filter_id
    }
}

/// A mined wave transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

#[derive(Deserialize)]
struct LogEntry {
    #[serde(default)]
    topics: Vec<B256>,
    #[serde(default)]
    data: Bytes,
    #[serde(default)]
    removed: bool,
}

impl<P: Provider> ContractHandle<P> {
    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Read every wave stored by the contract
    pub async fn fetch_all_records(&self) -> GatewayResult<Vec<WaveRecord>> {
        let call = json!([{
            "from": self.signer,
            "to": self.contract,
            "data": hex::encode_prefixed(abi::encode_get_all_waves()),
        }, "latest"]);

        let reply = self
            .provider
            .request("eth_call", call)
            .await
            .map_err(GatewayError::read)?;
        let data = decode_hex(&reply)?;

        let records: Vec<WaveRecord> = abi::decode_all_waves(&data)?
            .into_iter()
            .map(WaveRecord::from)
            .collect();

        tracing::info!(count = records.len(), contract = %self.contract, "Fetched waves");
        Ok(records)
    }

    /// Send a wave and wait until it is mined
    ///
    /// The message is trimmed; callers must not pass an empty one. The wait
    /// for the receipt has no timeout.
    pub async fn submit_wave(&self, message: &str) -> GatewayResult<Receipt> {
        let message = message.trim();
        let tx = json!([{
            "from": self.signer,
            "to": self.contract,
            "gas": format_quantity(self.gas_limit),
            "data": hex::encode_prefixed(abi::encode_wave(message)),
        }]);

        let hash = self
            .provider
            .request("eth_sendTransaction", tx)
            .await
            .map_err(GatewayError::write)?;
        let hash: B256 = serde_json::from_value(hash.clone()).map_err(|_| GatewayError::Write {
            kind: WriteFailureKind::Network,
            message: format!("unexpected transaction hash {hash}"),
        })?;

        tracing::info!(tx = %hash, "Wave sent, waiting to be mined");
        let receipt = self.wait_for_receipt(hash).await?;
        tracing::info!(tx = %hash, block = ?receipt.block_number, "Wave mined");
        Ok(receipt)
    }

    async fn wait_for_receipt(&self, hash: B256) -> GatewayResult<Receipt> {
        loop {
            let reply = self
                .provider
                .request("eth_getTransactionReceipt", json!([hash]))
                .await
                .map_err(|e| GatewayError::Write {
                    kind: WriteFailureKind::Network,
                    message: e.to_string(),
                })?;

            if reply.is_null() {
                self.timer.sleep(self.poll_interval).await;
                continue;
            }
            return parse_receipt(hash, &reply);
        }
    }

    /// Install a filter for new `NewWave` events from this contract
    pub async fn subscribe_new_records(&self) -> GatewayResult<WaveSubscription> {
        let filter = json!([{
            "address": self.contract,
            "topics": [abi::new_wave_topic()],
            "fromBlock": "latest",
        }]);

        let reply = self
            .provider
            .request("eth_newFilter", filter)
            .await
            .map_err(GatewayError::read)?;
        let filter_id = reply
            .as_str()
            .ok_or_else(|| GatewayError::Read(format!("unexpected filter id {reply}")))?
            .to_string();

        tracing::debug!(filter = %filter_id, "Subscribed to NewWave");
        Ok(WaveSubscription { filter_id })
    }

    /// Records emitted since the last poll, in delivery order
    ///
    /// Logs that fail to decode or were removed by a reorg are skipped.
    pub async fn poll_subscription(
        &self,
        subscription: &WaveSubscription,
    ) -> GatewayResult<Vec<WaveRecord>> {
        let reply = self
            .provider
            .request("eth_getFilterChanges", json!([subscription.filter_id]))
            .await
            .map_err(GatewayError::read)?;

        let logs: Vec<LogEntry> = serde_json::from_value(reply)
            .map_err(|e| GatewayError::Decode(format!("filter changes: {e}")))?;

        let mut records = Vec::with_capacity(logs.len());
        for log in logs {
            if log.removed {
                continue;
            }
            match abi::decode_new_wave(&log.topics, &log.data) {
                Ok(raw) => records.push(WaveRecord::from(raw)),
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable NewWave log"),
            }
        }
        Ok(records)
    }

    /// Uninstall the filter
    pub async fn unsubscribe(&self, subscription: WaveSubscription) -> GatewayResult<()> {
        self.provider
            .request("eth_uninstallFilter", json!([subscription.filter_id]))
            .await
            .map_err(GatewayError::read)?;
        tracing::debug!(filter = %subscription.filter_id, "Unsubscribed from NewWave");
        Ok(())
    }
}

fn decode_hex(value: &Value) -> GatewayResult<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| GatewayError::Decode(format!("expected hex data, got {value}")))?;
    hex::decode(s).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn parse_receipt(hash: B256, value: &Value) -> GatewayResult<Receipt> {
    let quantity = |field: &str| -> Result<Option<u64>, ProviderError> {
        match value.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => parse_quantity(v).map(Some),
        }
    };
    let malformed = |e: ProviderError| GatewayError::Write {
        kind: WriteFailureKind::Network,
        message: e.to_string(),
    };

    // Pre-Byzantium receipts carry no status; treat them as success.
    if quantity("status").map_err(malformed)? == Some(0) {
        return Err(GatewayError::Write {
            kind: WriteFailureKind::Reverted,
            message: format!("Transaction {hash} reverted"),
        });
    }

    Ok(Receipt {
        transaction_hash: hash,
        block_number: quantity("blockNumber").map_err(malformed)?,
        gas_used: quantity("gasUsed").map_err(malformed)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::abi::Wave;
    use crate::wallet::mock::{InstantTimer, MockProvider};
    use alloy_primitives::U256;
    use alloy_sol_types::SolValue;

    fn contract_config() -> ContractConfig {
        ContractConfig {
            address: Address::repeat_byte(0x77),
            gas_limit: 300_000,
            poll_interval_ms: 10,
        }
    }

    fn gateway(provider: &MockProvider, timer: &InstantTimer) -> ContractGateway<MockProvider> {
        ContractGateway::new(provider.clone(), Rc::new(timer.clone()), contract_config())
    }

    fn tx_hash() -> B256 {
        B256::repeat_byte(0x42)
    }

    #[tokio::test]
    async fn test_fetch_all_records() {
        let provider = MockProvider::new();
        let waves = vec![
            Wave {
                waver: Address::repeat_byte(0xbb),
                message: "yo".to_string(),
                timestamp: U256::from(50u64),
            },
            Wave {
                waver: Address::repeat_byte(0xaa),
                message: "hi".to_string(),
                timestamp: U256::from(100u64),
            },
        ];
        provider.respond(
            "eth_call",
            Ok(json!(hex::encode_prefixed(waves.abi_encode()))),
        );

        let handle = gateway(&provider, &InstantTimer::default()).open(Address::repeat_byte(0xab));
        let records = handle.fetch_all_records().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1], WaveRecord::new(Address::repeat_byte(0xaa), 100, "hi"));

        let params = provider.last_params("eth_call").unwrap();
        assert_eq!(params[1], "latest");
        assert_eq!(
            params[0]["to"].as_str().unwrap().to_lowercase(),
            Address::repeat_byte(0x77).to_string().to_lowercase()
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_read_error() {
        let provider = MockProvider::new();
        provider.fail("eth_call", ProviderError::Transport("connection refused".into()));
        let handle = gateway(&provider, &InstantTimer::default()).open(Address::ZERO);

        let err = handle.fetch_all_records().await.unwrap_err();
        assert!(matches!(err, GatewayError::Read(_)));
    }

    #[tokio::test]
    async fn test_submit_waits_for_receipt() {
        let provider = MockProvider::new();
        let timer = InstantTimer::default();
        provider.respond("eth_sendTransaction", Ok(json!(tx_hash())));
        provider.respond("eth_getTransactionReceipt", Ok(Value::Null));
        provider.respond("eth_getTransactionReceipt", Ok(Value::Null));
        provider.respond(
            "eth_getTransactionReceipt",
            Ok(json!({"status": "0x1", "blockNumber": "0x10", "gasUsed": "0x5208"})),
        );

        let handle = gateway(&provider, &timer).open(Address::repeat_byte(0xab));
        let receipt = handle.submit_wave("  hello there \n").await.unwrap();

        assert_eq!(receipt.transaction_hash, tx_hash());
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(receipt.gas_used, Some(21_000));
        assert_eq!(timer.sleeps.borrow().len(), 2);

        let tx = provider.last_params("eth_sendTransaction").unwrap();
        assert_eq!(tx[0]["gas"], "0x493e0");
        let data = hex::decode(tx[0]["data"].as_str().unwrap()).unwrap();
        assert_eq!(data, abi::encode_wave("hello there"));
    }

    #[tokio::test]
    async fn test_submit_rejected_by_user() {
        let provider = MockProvider::new();
        provider.fail(
            "eth_sendTransaction",
            ProviderError::rpc(4001, "User denied transaction signature."),
        );
        let handle = gateway(&provider, &InstantTimer::default()).open(Address::ZERO);

        let err = handle.submit_wave("hi").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Write {
                kind: WriteFailureKind::Rejected,
                message: "User denied transaction signature.".to_string(),
            }
        );
        assert_eq!(provider.calls("eth_getTransactionReceipt"), 0);
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let provider = MockProvider::new();
        provider.respond("eth_sendTransaction", Ok(json!(tx_hash())));
        provider.respond(
            "eth_getTransactionReceipt",
            Ok(json!({"status": "0x0", "blockNumber": "0x10"})),
        );
        let handle = gateway(&provider, &InstantTimer::default()).open(Address::ZERO);

        let err = handle.submit_wave("hi").await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Write {
                kind: WriteFailureKind::Reverted,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_subscription_lifecycle() {
        let provider = MockProvider::new();
        provider.respond("eth_newFilter", Ok(json!("0x1f")));

        let from = Address::repeat_byte(0xcc);
        let data = (U256::from(200u64), "new".to_string()).abi_encode_params();
        provider.respond(
            "eth_getFilterChanges",
            Ok(json!([
                {
                    "topics": [abi::new_wave_topic(), from.into_word()],
                    "data": hex::encode_prefixed(&data),
                    "removed": false
                },
                {
                    "topics": [abi::new_wave_topic()],
                    "data": "0x"
                },
                {
                    "topics": [abi::new_wave_topic(), from.into_word()],
                    "data": hex::encode_prefixed(&data),
                    "removed": true
                }
            ])),
        );

        let handle = gateway(&provider, &InstantTimer::default()).open(Address::ZERO);
        let subscription = handle.subscribe_new_records().await.unwrap();
        assert_eq!(subscription.filter_id(), "0x1f");

        let filter = provider.last_params("eth_newFilter").unwrap();
        assert_eq!(filter[0]["fromBlock"], "latest");

        let records = handle.poll_subscription(&subscription).await.unwrap();
        assert_eq!(records, vec![WaveRecord::new(from, 200, "new")]);

        assert!(handle.poll_subscription(&subscription).await.unwrap().is_empty());

        handle.unsubscribe(subscription).await.unwrap();
        assert_eq!(
            provider.last_params("eth_uninstallFilter").unwrap(),
            json!(["0x1f"])
        );
    }
}
