//! In-memory provider for tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::provider::{AccountsListener, Provider, ProviderError, CODE_METHOD_NOT_FOUND};
use crate::driver::Timer;

type Reply = Result<Value, ProviderError>;
type Handler = Rc<dyn Fn(Vec<Address>)>;

#[derive(Default)]
struct Inner {
    accounts: RefCell<Vec<Address>>,
    queued: RefCell<HashMap<String, VecDeque<Reply>>>,
    failures: RefCell<HashMap<String, ProviderError>>,
    requests: RefCell<Vec<(String, Value)>>,
    listeners: RefCell<Vec<(u64, Handler)>>,
    next_listener: Cell<u64>,
}

/// Scripted provider: queued replies first, then sticky failures, then defaults
#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Rc<Inner>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        *self.inner.accounts.borrow_mut() = accounts;
        self
    }

    /// Queue one reply for `method`
    pub fn respond(&self, method: &str, reply: Reply) {
        self.inner
            .queued
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Fail every call to `method` that has no queued reply
    pub fn fail(&self, method: &str, error: ProviderError) {
        self.inner
            .failures
            .borrow_mut()
            .insert(method.to_string(), error);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.inner
            .requests
            .borrow()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.inner
            .requests
            .borrow()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    pub fn emit_accounts(&self, accounts: Vec<Address>) {
        let handlers: Vec<Handler> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(accounts.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

#[async_trait(?Send)]
impl Provider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.inner
            .requests
            .borrow_mut()
            .push((method.to_string(), params));

        let queued = self
            .inner
            .queued
            .borrow_mut()
            .get_mut(method)
            .and_then(|q| q.pop_front());
        if let Some(reply) = queued {
            return reply;
        }
        if let Some(error) = self.inner.failures.borrow().get(method) {
            return Err(error.clone());
        }

        match method {
            "eth_accounts" | "eth_requestAccounts" => {
                let accounts: Vec<String> = self
                    .inner
                    .accounts
                    .borrow()
                    .iter()
                    .map(|a| a.to_string())
                    .collect();
                Ok(json!(accounts))
            }
            "eth_getFilterChanges" => Ok(json!([])),
            "eth_uninstallFilter" => Ok(json!(true)),
            _ => Err(ProviderError::rpc(
                CODE_METHOD_NOT_FOUND,
                format!("mock has no reply for {method}"),
            )),
        }
    }

    fn on_accounts_changed(&self, handler: Box<dyn Fn(Vec<Address>)>) -> AccountsListener {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::from(handler)));

        let inner = Rc::clone(&self.inner);
        AccountsListener::new(move || {
            inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
        })
    }
}

/// Timer that returns immediately and records what was asked of it
#[derive(Clone, Default)]
pub struct InstantTimer {
    pub sleeps: Rc<RefCell<Vec<Duration>>>,
}

#[async_trait(?Send)]
impl Timer for InstantTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
