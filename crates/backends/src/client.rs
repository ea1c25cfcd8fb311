// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SidecarClient` — resilient RPC to the in-sandbox sidecar (§4.4).
//!
//! The per-task `Arc<Mutex<HashMap<..>>>` registry idiom comes from
//! `RemoteCoopClient` (`adapters::agent::remote`), and the exponential-backoff
//! math from `shipper-retry::calculate_delay` (`EffortlessMetrics-shipper`),
//! narrowed here to a fixed `base * 2^(attempt-1)` policy with no jitter and
//! a closed error taxonomy that drives both the retry loop and the circuit
//! breaker.

use crate::error::TransportError;
use parking_lot::Mutex;
use reqwest::Method;
use sbx_core::{CircuitBreakerConfig, CircuitBreakerState, Clock, TaskId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SidecarClientConfig {
    pub request_timeout: Duration,
    pub base_delay: Duration,
    pub max_attempts: u32,
    pub breaker: CircuitBreakerConfig,
}

impl Default for SidecarClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            base_delay: Duration::from_secs(1),
            max_attempts: 3,
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Resilient HTTP client to a task's sidecar, with per-task circuit breaking.
///
/// One `SidecarClient` is shared across all tasks; the breaker map is the
/// only piece of cross-task shared state it carries (§5).
#[derive(Clone)]
pub struct SidecarClient<C: Clock> {
    http: reqwest::Client,
    config: SidecarClientConfig,
    breakers: Arc<Mutex<HashMap<TaskId, CircuitBreakerState>>>,
    clock: C,
}

impl<C: Clock> SidecarClient<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, SidecarClientConfig::default())
    }

    pub fn with_config(clock: C, config: SidecarClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            breakers: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Evict a task's breaker entry once its sandbox is gone, so the map
    /// doesn't grow unbounded across the fleet's lifetime (§5's janitor).
    pub fn forget(&self, task_id: &TaskId) {
        self.breakers.lock().remove(task_id);
    }

    fn allow(&self, task_id: &TaskId) -> bool {
        let mut breakers = self.breakers.lock();
        let state = breakers.entry(*task_id).or_default();
        state.allow(&self.config.breaker, self.clock.epoch_ms())
    }

    fn record_success(&self, task_id: &TaskId) {
        self.breakers.lock().entry(*task_id).or_default().on_success();
    }

    fn record_failure(&self, task_id: &TaskId) {
        let mut breakers = self.breakers.lock();
        let state = breakers.entry(*task_id).or_default();
        state.on_failure(&self.config.breaker, self.clock.epoch_ms());
    }

    /// Perform one JSON request/response exchange against `base_url`,
    /// retrying retryable failures with exponential backoff and failing
    /// fast when the task's breaker is open.
    pub async fn request<Req, Resp>(
        &self,
        task_id: &TaskId,
        base_url: &str,
        method: Method,
        path: &str,
        body: Option<&Req>,
    ) -> Result<Resp, TransportError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        if !self.allow(task_id) {
            return Err(TransportError::CircuitBreakerOpen);
        }

        let mut last_err = None;
        for attempt in 1..=self.config.max_attempts {
            match self.attempt(base_url, method.clone(), path, body).await {
                Ok(resp) => {
                    self.record_success(task_id);
                    return Ok(resp);
                }
                Err(err) => {
                    let retryable = err.is_retryable();
                    last_err = Some(err);
                    if !retryable || attempt == self.config.max_attempts {
                        break;
                    }
                    let delay = self.config.base_delay * 2u32.pow(attempt - 1);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        self.record_failure(task_id);
        Err(last_err.unwrap_or(TransportError::Unknown("no attempts made".to_string())))
    }

    async fn attempt<Req, Resp>(
        &self,
        base_url: &str,
        method: Method,
        path: &str,
        body: Option<&Req>,
    ) -> Result<Resp, TransportError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{base_url}{path}");
        let mut req = self.http.request(method, &url).timeout(self.config.request_timeout);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(classify_reqwest_error)?;
        let status = response.status();
        if status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Server { status: status.as_u16(), body: text });
        }
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Client { status: status.as_u16(), body: text });
        }

        response.json::<Resp>().await.map_err(|e| TransportError::Unknown(e.to_string()))
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(Duration::from_secs(0))
    } else if err.is_connect() {
        TransportError::Network(err.to_string())
    } else {
        TransportError::Unknown(err.to_string())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
