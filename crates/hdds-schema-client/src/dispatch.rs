// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP request dispatch.
//!
//! Every registry call goes through [`RequestDispatcher::send`]:
//!
//! ```text
//!   wait for a gate permit        (cancellable)
//!   attach credentials            (cancellable, may call a token provider)
//!   send + read body              (cancellable, per-request timeout)
//!   release permit                (RAII, every exit path)
//!   non-2xx -> RegistryError
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::auth::CredentialStore;
use crate::error::{self, RegistryError};

/// Content type understood by Confluent-compatible registries.
pub const REGISTRY_CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Default number of concurrent in-flight requests.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends registry requests under a fixed-capacity concurrency gate.
pub struct RequestDispatcher {
    base_url: String,
    http: Client,
    gate: Semaphore,
    capacity: usize,
    timeout_ms: AtomicU64,
    credentials: CredentialStore,
}

impl RequestDispatcher {
    /// Create a dispatcher for the registry at `base_url`.
    ///
    /// `capacity` bounds the number of requests in flight across all
    /// operations sharing this dispatcher; it must be at least 1.
    pub fn new(
        base_url: &str,
        http: Client,
        capacity: usize,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        Url::parse(base_url)
            .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if capacity == 0 {
            return Err(crate::config::ConfigError::Invalid(
                "max_concurrent_requests cannot be 0".into(),
            )
            .into());
        }

        Ok(RequestDispatcher {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            gate: Semaphore::new(capacity),
            capacity,
            timeout_ms: AtomicU64::new(duration_to_ms(timeout)),
            credentials: CredentialStore::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Gate capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free in the concurrency gate.
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// Change the timeout applied to subsequently issued requests.
    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_ms.store(duration_to_ms(timeout), Ordering::Relaxed);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Relaxed))
    }

    /// Perform one HTTP exchange and return the raw response body.
    ///
    /// `path` is relative to the base URL and may carry a query string.
    /// When `cancel` fires the exchange is abandoned at whichever await
    /// point it is parked on and `RegistryError::Cancelled` is returned;
    /// a held gate permit is released on the way out.
    pub async fn send(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, RegistryError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("{} {} cancelled", method, path);
                Err(RegistryError::Cancelled)
            }
            result = self.exchange(cancel, method.clone(), path, body) => result,
        }
    }

    async fn exchange(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, RegistryError> {
        let url = format!("{}{}", self.base_url, path);

        // The semaphore is never closed, so acquisition only fails if that
        // invariant is broken; surface it as a cancellation.
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| RegistryError::Cancelled)?;

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, REGISTRY_CONTENT_TYPE)
            .timeout(self.timeout());
        if let Some(body) = body {
            request = request.body(body);
        }
        let request = self.credentials.authorize(request, cancel).await?;

        log::debug!("{} {}", method, url);
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = error::from_response(status, &bytes);
            log::warn!("{} {} failed: {}", method, url, err);
            return Err(err);
        }
        Ok(bytes.to_vec())
    }
}

fn duration_to_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
