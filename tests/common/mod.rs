//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio::time::Instant;

use signal_assistant::application::errors::{BusError, FeedError, SendError};
use signal_assistant::domain::entities::{OutboundMessage, Quote};
use signal_assistant::domain::traits::{BusClient, InboundStream, PriceFeed};

pub const OWNER: &str = "+15551234567";
pub const STRANGER: &str = "+15559876543";

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// In-memory bus that records every send with the time it happened
#[derive(Default)]
pub struct RecordingBus {
    sent: Mutex<Vec<(Instant, OutboundMessage)>>,
    fail_next: Mutex<usize>,
    fail_always: AtomicBool,
}

impl RecordingBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The next `count` sends fail with a transport error
    pub fn fail_next(&self, count: usize) {
        *self.fail_next.lock().unwrap() = count;
    }

    pub fn fail_always(&self) {
        self.fail_always.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn timed(&self) -> Vec<(Instant, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BusClient for RecordingBus {
    fn subscribe(&self) -> Result<InboundStream, BusError> {
        Err(BusError::Startup("recording bus has no inbound side".to_string()))
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        if self.fail_always.load(Ordering::SeqCst) {
            return Err(SendError::Transport("bus down".to_string()));
        }
        {
            let mut remaining = self.fail_next.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SendError::Transport("bus down".to_string()));
            }
        }
        self.sent.lock().unwrap().push((Instant::now(), message.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Price feed answering from a script, one queued answer per call and symbol
#[derive(Default)]
pub struct ScriptedFeed {
    answers: Mutex<HashMap<String, VecDeque<Result<Option<Quote>, FeedError>>>>,
}

impl ScriptedFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, symbol_id: &str, answer: Result<Option<Quote>, FeedError>) {
        self.answers
            .lock()
            .unwrap()
            .entry(symbol_id.to_string())
            .or_default()
            .push_back(answer);
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn get_quote(&self, symbol_id: &str) -> Result<Option<Quote>, FeedError> {
        self.answers
            .lock()
            .unwrap()
            .get_mut(symbol_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Ok(None))
    }
}

/// Fresh empty directory under the system temp dir
pub fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("assistant-{}-{}", label, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
