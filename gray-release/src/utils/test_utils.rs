use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::{
    api::errors::GrayReleaseError,
    routing::navigation::{NavigationKind, NavigationPort, NavigationRequest, PageInfo, PageStack},
    rules::{
        rule_fetcher::{RuleFetcher, RuleResponse},
        rule_models::GrayRule,
    },
    storage::{KeyValueStore, StorageError},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// An open rule that selects every user.
pub fn open_rule() -> GrayRule {
    GrayRule {
        is_open: true,
        all: true,
        ..GrayRule::default()
    }
}

/// Records every call and succeeds unless told to fail.
#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<(NavigationKind, NavigationRequest)>>,
    failures: Mutex<VecDeque<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(NavigationKind, NavigationRequest)> {
        lock(&self.calls).clone()
    }

    pub fn fail_next(&self, message: &str) {
        lock(&self.failures).push_back(message.to_string());
    }

    fn record(&self, kind: NavigationKind, request: NavigationRequest) -> anyhow::Result<()> {
        if let Some(message) = lock(&self.failures).pop_front() {
            return Err(anyhow::anyhow!(message));
        }
        lock(&self.calls).push((kind, request));
        Ok(())
    }
}

impl NavigationPort for RecordingNavigator {
    fn navigate_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        self.record(NavigationKind::Navigate, request)
    }

    fn redirect_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        self.record(NavigationKind::Redirect, request)
    }

    fn relaunch(&self, request: NavigationRequest) -> anyhow::Result<()> {
        self.record(NavigationKind::Relaunch, request)
    }
}

/// A page stack whose content the test controls.
#[derive(Default)]
pub struct StaticPageStack {
    pages: Mutex<Vec<PageInfo>>,
}

impl StaticPageStack {
    pub fn new(pages: Vec<PageInfo>) -> Self {
        Self {
            pages: Mutex::new(pages),
        }
    }

    pub fn push(&self, page: PageInfo) {
        lock(&self.pages).push(page);
    }

    /// Applies a redirect the way the host would: the top page is replaced.
    pub fn replace_top(&self, page: PageInfo) {
        let mut pages = lock(&self.pages);
        pages.pop();
        pages.push(page);
    }
}

impl PageStack for StaticPageStack {
    fn current_pages(&self) -> Vec<PageInfo> {
        lock(&self.pages).clone()
    }
}

/// Serves canned responses; the last one repeats.
#[derive(Default)]
pub struct MockRuleFetcher {
    responses: Mutex<VecDeque<Result<RuleResponse, String>>>,
    calls: AtomicUsize,
}

impl MockRuleFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, status_code: u16, body: Value) -> Self {
        self.respond_raw(status_code, &body.to_string())
    }

    pub fn respond_raw(self, status_code: u16, body: &str) -> Self {
        lock(&self.responses).push_back(Ok(RuleResponse {
            status_code,
            body: body.to_string(),
        }));
        self
    }

    pub fn fail_transport(self, message: &str) -> Self {
        lock(&self.responses).push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleFetcher for MockRuleFetcher {
    async fn fetch(&self) -> Result<RuleResponse, GrayReleaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut responses = lock(&self.responses);
            if responses.len() > 1 {
                responses.pop_front()
            } else {
                responses.front().cloned()
            }
        };

        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(GrayReleaseError::RuleTransport(message)),
            None => Err(GrayReleaseError::RuleTransport(
                "no response configured".to_string(),
            )),
        }
    }
}

/// Holds its first fetch until released; later fetches answer immediately.
pub struct GatedRuleFetcher {
    first: Value,
    rest: Value,
    calls: AtomicUsize,
    entered: Notify,
    gate: Notify,
}

impl GatedRuleFetcher {
    pub fn new(first: Value, rest: Value) -> Self {
        Self {
            first,
            rest,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once the first fetch is parked on the gate.
    pub async fn wait_until_gated(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl RuleFetcher for GatedRuleFetcher {
    async fn fetch(&self) -> Result<RuleResponse, GrayReleaseError> {
        let body = if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.gate.notified().await;
            self.first.to_string()
        } else {
            self.rest.to_string()
        };

        Ok(RuleResponse {
            status_code: 200,
            body,
        })
    }
}

/// Storage that is never available.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Value>, StorageError> {
        Err(StorageError::Unavailable("storage is offline".to_string()))
    }

    fn set(&self, _key: &str, _value: Value) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage is offline".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage is offline".to_string()))
    }
}
