// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry authentication.
//!
//! Exactly one [`AuthScheme`] is active per client: static HTTP Basic
//! credentials or a bearer token fetched from a [`TokenProvider`] on every
//! request. Installing one replaces the other.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::RequestBuilder;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, RegistryError};

/// Source of bearer tokens, consulted once per request.
///
/// Implementations may perform network calls; the future is dropped when
/// the enclosing request is cancelled. `cancel` is the request's token, for
/// work the provider spawns or hands off elsewhere.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn obtain_token(&self, cancel: &CancellationToken) -> Result<String, BoxError>;
}

/// Fixed token, for registries fronted by long-lived API keys.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn obtain_token(&self, _cancel: &CancellationToken) -> Result<String, BoxError> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

/// Attaches credentials to an outgoing request.
#[async_trait]
pub trait AuthScheme: Send + Sync {
    async fn authorize(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<RequestBuilder, RegistryError>;
}

// ---------------------------------------------------------------------------
// Schemes
// ---------------------------------------------------------------------------

/// HTTP Basic authentication.
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        BasicAuth {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[async_trait]
impl AuthScheme for BasicAuth {
    async fn authorize(
        &self,
        request: RequestBuilder,
        _cancel: &CancellationToken,
    ) -> Result<RequestBuilder, RegistryError> {
        Ok(request.basic_auth(&self.username, Some(&self.password)))
    }
}

/// Bearer authentication backed by a [`TokenProvider`].
pub struct BearerAuth {
    provider: Arc<dyn TokenProvider>,
}

impl BearerAuth {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        BearerAuth { provider }
    }
}

#[async_trait]
impl AuthScheme for BearerAuth {
    async fn authorize(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<RequestBuilder, RegistryError> {
        let token = self.provider.obtain_token(cancel).await.map_err(|e| {
            log::warn!("bearer token provider failed: {}", e);
            RegistryError::Token(e)
        })?;
        Ok(request.bearer_auth(token))
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Slot holding the active authentication scheme.
///
/// Requests take a snapshot before authorizing, so swapping credentials
/// never affects a request already in flight.
#[derive(Default)]
pub struct CredentialStore {
    active: RwLock<Option<Arc<dyn AuthScheme>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install Basic credentials. Empty username or password leaves the
    /// current scheme untouched and returns `false`.
    pub fn set_basic(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }
        self.install(Arc::new(BasicAuth::new(username, password)));
        true
    }

    /// Install a bearer token provider, replacing any Basic credentials.
    pub fn set_bearer(&self, provider: Arc<dyn TokenProvider>) {
        self.install(Arc::new(BearerAuth::new(provider)));
    }

    /// Install an arbitrary scheme.
    pub fn install(&self, scheme: Arc<dyn AuthScheme>) {
        *self.active.write() = Some(scheme);
    }

    pub fn clear(&self) {
        *self.active.write() = None;
    }

    pub fn snapshot(&self) -> Option<Arc<dyn AuthScheme>> {
        self.active.read().clone()
    }

    /// Apply the active scheme, if any, to `request`.
    pub async fn authorize(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<RequestBuilder, RegistryError> {
        match self.snapshot() {
            Some(scheme) => scheme.authorize(request, cancel).await,
            None => Ok(request),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
