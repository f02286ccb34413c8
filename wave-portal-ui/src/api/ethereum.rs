//! `window.ethereum` Provider
//!
//! Requests go through `ethereum.request({ method, params })`. Arguments and
//! results cross the boundary as JSON text so the library only ever sees
//! `serde_json::Value`.

use alloy_primitives::Address;
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect, JSON};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use wave_portal::wallet::provider::parse_accounts;
use wave_portal::{AccountsListener, Provider, ProviderError};

#[wasm_bindgen]
extern "C" {
    /// The injected EIP-1193 object
    #[derive(Debug, Clone)]
    pub type Ethereum;

    #[wasm_bindgen(method, catch)]
    fn request(this: &Ethereum, args: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Ethereum, event: &str, handler: &Function);

    #[wasm_bindgen(method, js_name = removeListener)]
    fn remove_listener(this: &Ethereum, event: &str, handler: &Function);
}

/// Provider backed by the browser wallet extension
#[derive(Debug, Clone)]
pub struct BrowserProvider {
    ethereum: Ethereum,
}

impl BrowserProvider {
    /// The injected wallet, if the page has one
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        Some(Self {
            ethereum: value.unchecked_into(),
        })
    }
}

#[async_trait(?Send)]
impl Provider for BrowserProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = serde_json::json!({ "method": method, "params": params }).to_string();
        let args = JSON::parse(&args).map_err(|e| ProviderError::Malformed(describe(&e)))?;

        let promise = self.ethereum.request(&args).map_err(rpc_error)?;
        let result = JsFuture::from(promise).await.map_err(rpc_error)?;
        to_json(&result)
    }

    fn on_accounts_changed(&self, handler: Box<dyn Fn(Vec<Address>)>) -> AccountsListener {
        let callback = Closure::<dyn Fn(JsValue)>::new(move |accounts: JsValue| {
            match to_json(&accounts).and_then(|v| parse_accounts(&v)) {
                Ok(accounts) => handler(accounts),
                Err(e) => web_sys::console::warn_1(
                    &format!("Ignoring accountsChanged payload: {e}").into(),
                ),
            }
        });
        self.ethereum
            .on("accountsChanged", callback.as_ref().unchecked_ref());

        let ethereum = self.ethereum.clone();
        AccountsListener::new(move || {
            ethereum.remove_listener("accountsChanged", callback.as_ref().unchecked_ref());
        })
    }
}

fn to_json(value: &JsValue) -> Result<Value, ProviderError> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    let text: String = JSON::stringify(value)
        .map_err(|e| ProviderError::Malformed(describe(&e)))?
        .into();
    serde_json::from_str(&text).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Wallet errors carry `code`, `message` and sometimes `data.message`
fn rpc_error(error: JsValue) -> ProviderError {
    let field = |target: &JsValue, name: &str| Reflect::get(target, &JsValue::from_str(name)).ok();

    let message = field(&error, "message")
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| describe(&error));

    match field(&error, "code").and_then(|c| c.as_f64()) {
        Some(code) => {
            let reason = field(&error, "data")
                .filter(|data| data.is_object())
                .and_then(|data| field(&data, "message"))
                .and_then(|m| m.as_string());
            ProviderError::Rpc {
                code: code as i64,
                message,
                reason,
            }
        }
        None => ProviderError::Transport(message),
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
