//! Deterministic provider used by the word supply tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;
use tokio::sync::Semaphore;

use super::{ProviderError, ProviderResult, WordProvider, WordRequest};

/// Replays queued replies, then generates unique words once the script runs out.
#[derive(Default)]
pub struct ScriptedWordProvider {
    script: Mutex<VecDeque<Option<Vec<String>>>>,
    requests: Mutex<Vec<WordRequest>>,
    generated: AtomicUsize,
    always_fail: bool,
    unconfigured: bool,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedWordProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    /// Provider failing every call with a permanent error.
    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    /// Calls wait for a permit on `gate` before answering.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, words: &[&str]) -> Self {
        self.push(Some(words.iter().map(|w| w.to_string()).collect()))
    }

    /// Queue a failed attempt.
    pub fn fail(self) -> Self {
        self.push(None)
    }

    fn push(self, entry: Option<Vec<String>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
        self
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<WordRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn answer(&self, request: &WordRequest) -> ProviderResult<Vec<String>> {
        if self.unconfigured {
            return Err(ProviderError::NotConfigured);
        }
        if self.always_fail {
            return Err(ProviderError::EmptyCompletion);
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match scripted {
            Some(Some(words)) => Ok(words),
            Some(None) => Err(ProviderError::EmptyCompletion),
            None => Ok((0..request.count)
                .map(|_| {
                    let n = self.generated.fetch_add(1, Ordering::SeqCst);
                    format!("{}-{}-{n}", request.language, request.category)
                })
                .collect()),
        }
    }
}

impl WordProvider for ScriptedWordProvider {
    fn fetch_words(&self, request: WordRequest) -> BoxFuture<'static, ProviderResult<Vec<String>>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let answer = self.answer(&request);
        let gate = self.gate.clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                let _permit = gate.acquire().await;
            }
            answer
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
