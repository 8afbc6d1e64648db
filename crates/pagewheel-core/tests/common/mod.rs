//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the core
//! drives its injected capabilities.

#![allow(dead_code)]

use pagewheel_core::config::SchedulerConfig;
use pagewheel_core::error::{Error, Result};
use pagewheel_core::traits::{Display, FetchResponse, Fetcher};
use pagewheel_core::SchedulerEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A single call made on a display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Show(String),
    Clear,
}

/// A Display that records every call
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    calls: Arc<Mutex<Vec<DisplayCall>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls in order
    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Addresses passed to show(), in order
    pub fn shown(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DisplayCall::Show(address) => Some(address),
                DisplayCall::Clear => None,
            })
            .collect()
    }

    /// Number of clear() calls
    pub fn clear_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == DisplayCall::Clear)
            .count()
    }
}

#[async_trait::async_trait]
impl Display for RecordingDisplay {
    async fn show(&self, address: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(DisplayCall::Show(address.to_string()));
    }

    async fn clear(&self) {
        self.calls.lock().unwrap().push(DisplayCall::Clear);
    }
}

/// Scripted outcome for a URI
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(u16, String),
    Fail(String),
}

/// A Fetcher that answers from a script and records requests
///
/// Unscripted URIs fail with a transport error.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<HashMap<String, Scripted>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `uri` with the given status and body
    pub fn respond(self, uri: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(uri.into(), Scripted::Respond(status, body.into()));
        self
    }

    /// Fail `uri` with a transport error
    pub fn fail(self, uri: impl Into<String>, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(uri.into(), Scripted::Fail(message.into()));
        self
    }

    /// Requested URIs, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse> {
        self.requests.lock().unwrap().push(uri.to_string());
        let scripted = self.script.lock().unwrap().get(uri).cloned();
        match scripted {
            Some(Scripted::Respond(status, body)) => Ok(FetchResponse::new(status, body)),
            Some(Scripted::Fail(message)) => Err(Error::fetch(message)),
            None => Err(Error::fetch(format!("connection refused: {}", uri))),
        }
    }
}

/// A Fetcher where every request fails
#[derive(Clone, Default)]
pub struct FailingFetcher {
    calls: Arc<AtomicUsize>,
}

impl FailingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for FailingFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::fetch(format!("network unreachable: {}", uri)))
    }
}

/// Relay templates used by contract tests
pub const RELAY_A: &str = "https://relay-a.test/raw?url={url}";
pub const RELAY_B: &str = "https://relay-b.test/?{url}";

/// Relay URI for a target, as RelayRetrieval builds it
pub fn relay_uri(template: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    template.replace("{url}", &encoded)
}

/// Scheduler config with a fixed dwell, for deterministic timing
pub fn fixed_dwell_config(secs: f64) -> SchedulerConfig {
    SchedulerConfig::default().with_dwell_range(secs, secs)
}

/// Receive events until (and including) the next `Rotated`
pub async fn events_until_rotation(
    events: &mut mpsc::Receiver<SchedulerEvent>,
) -> Vec<SchedulerEvent> {
    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        let done = matches!(event, SchedulerEvent::Rotated { .. });
        seen.push(event);
        if done {
            break;
        }
    }
    seen
}
