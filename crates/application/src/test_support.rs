//! Scripted transport shared by the unit tests.

#![allow(clippy::unwrap_used, missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{Barrier, Notify};
use farmhand_domain::{ApiRequest, ApiResponse};

use crate::ports::{HttpTransport, TransportError};

/// In-memory backend.
///
/// Scripted paths answer with their fixed response. Every other path answers
/// 200 `{}` when the bearer token equals the accepted one and 401 otherwise.
#[derive(Clone)]
pub struct ScriptedTransport {
    inner: Arc<Inner>,
}

struct Inner {
    accepted: String,
    scripted: Mutex<HashMap<String, Vec<(u16, Value)>>>,
    protected: Mutex<HashMap<String, Value>>,
    log: Mutex<Vec<ApiRequest>>,
    stale_barrier: Mutex<Option<Arc<Barrier>>>,
    refresh_yields: AtomicUsize,
    refresh_gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedTransport {
    pub fn accepting(token: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                accepted: token.to_string(),
                scripted: Mutex::new(HashMap::new()),
                protected: Mutex::new(HashMap::new()),
                log: Mutex::new(Vec::new()),
                stale_barrier: Mutex::new(None),
                refresh_yields: AtomicUsize::new(0),
                refresh_gate: Mutex::new(None),
            }),
        }
    }

    /// Holds 401 answers until `n` of them are pending, then releases them together.
    pub fn hold_stale_until(self, n: usize) -> Self {
        *self.inner.stale_barrier.lock() = Some(Arc::new(Barrier::new(n)));
        self
    }

    /// Makes the refresh endpoint yield `n` times before answering.
    pub fn delay_refresh(&self, n: usize) {
        self.inner.refresh_yields.store(n, Ordering::SeqCst);
    }

    /// Makes the refresh endpoint wait until the returned handle is notified.
    pub fn gate_refresh(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.refresh_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Scripts the answer for `path`. Several calls queue answers in order;
    /// the last one repeats.
    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.inner
            .scripted
            .lock()
            .entry(path.to_string())
            .or_default()
            .push((status, body));
    }

    /// Sets the body a protected path returns once the accepted token is presented.
    pub fn protect(&self, path: &str, body: Value) {
        self.inner.protected.lock().insert(path.to_string(), body);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.requests(path).len()
    }

    pub fn bearer_tokens(&self, path: &str) -> Vec<Option<String>> {
        self.requests(path)
            .iter()
            .map(|r| r.headers.bearer_token().map(str::to_string))
            .collect()
    }

    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.requests(path)
            .into_iter()
            .filter_map(|r| r.body)
            .collect()
    }

    /// Paths of every request that carried `token`, in send order.
    pub fn paths_sent_with(&self, token: &str) -> Vec<String> {
        self.inner
            .log
            .lock()
            .iter()
            .filter(|r| r.headers.bearer_token() == Some(token))
            .map(|r| r.path.clone())
            .collect()
    }

    pub fn requests(&self, path: &str) -> Vec<ApiRequest> {
        self.inner
            .log
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    fn next_scripted(&self, path: &str) -> Option<(u16, Value)> {
        let mut scripted = self.inner.scripted.lock();
        let queue = scripted.get_mut(path)?;
        if queue.len() > 1 {
            Some(queue.remove(0))
        } else {
            queue.first().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.inner.log.lock().push(request.clone());

        if let Some((status, body)) = self.next_scripted(&request.path) {
            if request.path == "/auth/refresh" {
                let gate = self.inner.refresh_gate.lock().clone();
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                for _ in 0..self.inner.refresh_yields.load(Ordering::SeqCst) {
                    tokio::task::yield_now().await;
                }
            }
            return Ok(ApiResponse::json_body(status, &body));
        }

        if request.headers.bearer_token() == Some(self.inner.accepted.as_str()) {
            let body = self.inner.protected.lock().get(&request.path).cloned();
            return Ok(ApiResponse::json_body(200, &body.unwrap_or_else(|| json!({}))));
        }
        let barrier = self.inner.stale_barrier.lock().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
        Ok(ApiResponse::json_body(401, &json!({"message": "token expired"})))
    }
}

/// Success body of sign-in, sign-up and refresh.
pub fn session_body(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "user": {"id": "u1", "email": "ops@example.com", "name": "Ops", "role": "admin"}
    })
}
