//! JSON-RPC over HTTP
//!
//! Provider for the terminal hosts: talks to a node that holds unlocked
//! accounts. Nodes have no push channel for account changes, so
//! [`HttpProvider::refresh_accounts`] polls `eth_accounts` and notifies
//! listeners when the list differs from the last one seen.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::provider::{parse_accounts, AccountsListener, Provider, ProviderError};

type Handler = Rc<dyn Fn(Vec<Address>)>;

#[derive(Default)]
struct Listeners {
    handlers: RefCell<Vec<(u64, Handler)>>,
    next_id: Cell<u64>,
    last_seen: RefCell<Option<Vec<Address>>>,
}

/// HTTP JSON-RPC provider
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    url: String,
    listeners: Rc<Listeners>,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl HttpProvider {
    /// Create a provider for the node at `url`
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            listeners: Rc::new(Listeners::default()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Poll `eth_accounts` and notify listeners if the account list changed
    ///
    /// The first poll only records the baseline.
    pub async fn refresh_accounts(&self) -> Result<(), ProviderError> {
        let accounts = parse_accounts(&self.request("eth_accounts", json!([])).await?)?;

        let previous = self.listeners.last_seen.replace(Some(accounts.clone()));
        match previous {
            Some(previous) if previous != accounts => {
                let handlers: Vec<Handler> = self
                    .listeners
                    .handlers
                    .borrow()
                    .iter()
                    .map(|(_, h)| Rc::clone(h))
                    .collect();
                tracing::debug!(listeners = handlers.len(), "Node accounts changed");
                for handler in handlers {
                    handler(accounts.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl Provider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        };

        tracing::trace!(method, url = %self.url, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Transport(format!("{method} timed out"))
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let reply: RpcResponse = response.json().await.map_err(|e| {
            ProviderError::Malformed(format!("{method} returned HTTP {status}: {e}"))
        })?;

        if let Some(error) = reply.error {
            return Err(ProviderError::Rpc {
                code: error.code,
                message: error.message,
                reason: error.data.as_ref().and_then(data_reason),
            });
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }

    fn on_accounts_changed(&self, handler: Box<dyn Fn(Vec<Address>)>) -> AccountsListener {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id + 1);
        self.listeners
            .handlers
            .borrow_mut()
            .push((id, Rc::from(handler)));

        let listeners = Rc::clone(&self.listeners);
        AccountsListener::new(move || {
            listeners
                .handlers
                .borrow_mut()
                .retain(|(other, _)| *other != id);
        })
    }
}

/// Pull a human-readable reason out of a JSON-RPC error `data` field
fn data_reason(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.starts_with("0x") => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("reason"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    }
}
