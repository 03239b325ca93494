// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::auth::TokenProvider;
use crate::cache::SchemaCache;
use crate::compatibility::{
    CompatibilityLevel, CompatibilityResponse, ConfigChange, ConfigResponse,
};
use crate::config::ClientConfig;
use crate::dispatch::{
    segment, RequestDispatcher, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_TIMEOUT,
};
use crate::error::RegistryError;
use crate::registry::{
    normalize_schema, Reference, Schema, SchemaRequest, SchemaResponse, SchemaType, Version,
};

// ---------------------------------------------------------------------------
// SchemaRegistryClient
// ---------------------------------------------------------------------------

/// Caching, concurrency-bounded client for a Confluent-compatible schema
/// registry.
///
/// Cloning is cheap: clones share the cache, credentials, toggles and the
/// concurrency gate. Each clone carries its own cancellation token, see
/// [`SchemaRegistryClient::with_cancellation`].
#[derive(Clone)]
pub struct SchemaRegistryClient {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

struct ClientInner {
    dispatcher: RequestDispatcher,
    cache: SchemaCache,
    caching_enabled: AtomicBool,
    cache_latest: AtomicBool,
    codec_creation_enabled: AtomicBool,
}

impl SchemaRegistryClient {
    /// Client with default settings: 5 s timeout, 16 concurrent requests,
    /// caching on, `latest` caching off, eager codec creation off.
    pub fn new(url: &str) -> Result<Self, RegistryError> {
        let http = Client::builder().build()?;
        Self::with_options(url, http, DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    /// Client using a caller-supplied HTTP client and gate capacity.
    pub fn with_options(
        url: &str,
        http: Client,
        max_concurrent_requests: usize,
    ) -> Result<Self, RegistryError> {
        let dispatcher =
            RequestDispatcher::new(url, http, max_concurrent_requests, DEFAULT_TIMEOUT)?;
        Ok(SchemaRegistryClient {
            inner: Arc::new(ClientInner {
                dispatcher,
                cache: SchemaCache::new(),
                caching_enabled: AtomicBool::new(true),
                cache_latest: AtomicBool::new(false),
                codec_creation_enabled: AtomicBool::new(false),
            }),
            cancel: CancellationToken::new(),
        })
    }

    /// Client built from a validated [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let http = Client::builder().build()?;
        let client = Self::with_options(&config.url, http, config.max_concurrent_requests)?;
        client.set_timeout(config.timeout());
        client.set_caching_enabled(config.caching_enabled);
        client.set_cache_latest(config.cache_latest);
        client.set_codec_creation_enabled(config.codec_creation_enabled);
        if let Some(ref auth) = config.basic_auth {
            client.set_credentials(&auth.username, &auth.password);
        }
        Ok(client)
    }

    /// Handle sharing this client's state whose calls abort with
    /// [`RegistryError::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        SchemaRegistryClient {
            inner: Arc::clone(&self.inner),
            cancel: token,
        }
    }

    /// Token governing this handle's calls.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    // -- configuration ------------------------------------------------------

    /// Use HTTP Basic authentication. Ignored when either value is empty.
    pub fn set_credentials(&self, username: &str, password: &str) {
        if self.inner.dispatcher.credentials().set_basic(username, password) {
            log::info!("schema registry: using basic auth as '{}'", username);
        }
    }

    /// Use bearer tokens from `provider`, replacing Basic credentials.
    pub fn set_bearer_token(&self, provider: Arc<dyn TokenProvider>) {
        self.inner.dispatcher.credentials().set_bearer(provider);
        log::info!("schema registry: using bearer token auth");
    }

    /// Send subsequent requests unauthenticated.
    pub fn clear_credentials(&self) {
        self.inner.dispatcher.credentials().clear();
    }

    /// Timeout applied to each subsequently issued request.
    pub fn set_timeout(&self, timeout: Duration) {
        self.inner.dispatcher.set_timeout(timeout);
    }

    pub fn timeout(&self) -> Duration {
        self.inner.dispatcher.timeout()
    }

    /// Enable or bypass the schema cache. Disabling keeps existing entries.
    pub fn set_caching_enabled(&self, value: bool) {
        self.inner.caching_enabled.store(value, Ordering::Relaxed);
    }

    pub fn caching_enabled(&self) -> bool {
        self.inner.caching_enabled.load(Ordering::Relaxed)
    }

    /// Whether `latest` lookups are served from and stored into the cache.
    pub fn set_cache_latest(&self, value: bool) {
        self.inner.cache_latest.store(value, Ordering::Relaxed);
    }

    pub fn cache_latest(&self) -> bool {
        self.inner.cache_latest.load(Ordering::Relaxed)
    }

    /// Compile Avro codecs as soon as schemas are fetched.
    pub fn set_codec_creation_enabled(&self, value: bool) {
        self.inner
            .codec_creation_enabled
            .store(value, Ordering::Relaxed);
    }

    pub fn codec_creation_enabled(&self) -> bool {
        self.inner.codec_creation_enabled.load(Ordering::Relaxed)
    }

    /// Drop every cached schema.
    pub fn reset_cache(&self) {
        self.inner.cache.reset();
        log::info!("schema registry: cache reset");
    }

    /// Shared schema cache.
    pub fn cache(&self) -> &SchemaCache {
        &self.inner.cache
    }

    /// Free slots in the concurrency gate.
    pub fn available_permits(&self) -> usize {
        self.inner.dispatcher.available_permits()
    }

    // -- schemas ------------------------------------------------------------

    /// Schema registered under the global `id`.
    pub async fn get_schema(&self, id: u32) -> Result<Arc<Schema>, RegistryError> {
        if self.caching_enabled() {
            if let Some(schema) = self.inner.cache.get_by_id(id) {
                log::debug!("schema registry: cache hit for id {}", id);
                return Ok(schema);
            }
        }

        let schema = self.fetch_by_id(id).await?;
        if self.caching_enabled() {
            self.inner.cache.put_by_id(id, Arc::clone(&schema));
        }
        Ok(schema)
    }

    /// `GET /schemas/ids/{id}` without consulting the cache.
    async fn fetch_by_id(&self, id: u32) -> Result<Arc<Schema>, RegistryError> {
        let resp: SchemaResponse = self
            .request(Method::GET, &format!("/schemas/ids/{}", id), None::<&()>)
            .await?;
        self.materialize(Schema::from_response(resp, Some(id)))
    }

    /// Newest schema registered under `subject`.
    pub async fn get_latest_schema(&self, subject: &str) -> Result<Arc<Schema>, RegistryError> {
        self.resolve_version(subject, Version::Latest).await
    }

    /// Schema registered under `subject` at `version`.
    pub async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Arc<Schema>, RegistryError> {
        self.resolve_version(subject, Version::Number(version)).await
    }

    async fn resolve_version(
        &self,
        subject: &str,
        version: Version,
    ) -> Result<Arc<Schema>, RegistryError> {
        let caching = self.caching_enabled();
        let cacheable = caching && (!version.is_latest() || self.cache_latest());

        if cacheable {
            if let Some(schema) = self.inner.cache.get_by_version(subject, version) {
                log::debug!("schema registry: cache hit for {} v{}", subject, version);
                return Ok(schema);
            }
        }

        let path = format!("/subjects/{}/versions/{}", segment(subject), version);
        let resp: SchemaResponse = self.request(Method::GET, &path, None::<&()>).await?;
        let schema = self.materialize(Schema::from_response(resp, None))?;

        if caching {
            if cacheable {
                self.inner
                    .cache
                    .put_by_version(subject, version, Arc::clone(&schema));
            }
            self.inner.cache.put_both(subject, &schema);
        }
        Ok(schema)
    }

    /// Version numbers registered under `subject`. Never cached.
    pub async fn get_schema_versions(&self, subject: &str) -> Result<Vec<u32>, RegistryError> {
        let path = format!("/subjects/{}/versions", segment(subject));
        self.request(Method::GET, &path, None::<&()>).await
    }

    /// Register `schema` under `subject` and return the stored schema.
    ///
    /// Registering a definition identical to an existing one returns the
    /// existing id and version (decided by the registry).
    pub async fn create_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<Arc<Schema>, RegistryError> {
        let schema = normalize_schema(schema, schema_type);
        let body = SchemaRequest::new(&schema, schema_type, references);
        let path = format!("/subjects/{}/versions", segment(subject));
        let resp: SchemaResponse = self.request(Method::POST, &path, Some(&body)).await?;

        // Registration only echoes the id. A cached by-id entry may carry the
        // version of another subject, so always refetch.
        let created = self.fetch_by_id(resp.id).await?;

        if self.caching_enabled() {
            self.inner.cache.put_by_id(created.id(), Arc::clone(&created));
        }
        Ok(created)
    }

    /// Find `schema` among the versions of `subject` without registering it.
    pub async fn lookup_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<Arc<Schema>, RegistryError> {
        let schema = normalize_schema(schema, schema_type);
        let body = SchemaRequest::new(&schema, schema_type, references);
        let path = format!("/subjects/{}", segment(subject));
        let resp: SchemaResponse = self.request(Method::POST, &path, Some(&body)).await?;
        let found = self.materialize(Schema::from_response(resp, None))?;

        if self.caching_enabled() {
            self.inner.cache.put_both(subject, &found);
        }
        Ok(found)
    }

    /// Ask the registry whether `schema` is compatible with `subject` at
    /// `version`. Never cached.
    pub async fn is_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
        version: Version,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<bool, RegistryError> {
        let body = SchemaRequest::new(schema, schema_type, references);
        let path = format!(
            "/compatibility/subjects/{}/versions/{}",
            segment(subject),
            version
        );
        let resp: CompatibilityResponse = self.request(Method::POST, &path, Some(&body)).await?;
        Ok(resp.is_compatible)
    }

    // -- compatibility levels -----------------------------------------------

    pub async fn get_global_compatibility_level(
        &self,
    ) -> Result<CompatibilityLevel, RegistryError> {
        let resp: ConfigResponse = self.request(Method::GET, "/config", None::<&()>).await?;
        Ok(resp.compatibility_level)
    }

    /// Compatibility level of `subject`. With `default_to_global`, the
    /// global level is returned when the subject has none of its own.
    pub async fn get_compatibility_level(
        &self,
        subject: &str,
        default_to_global: bool,
    ) -> Result<CompatibilityLevel, RegistryError> {
        let path = format!(
            "/config/{}?defaultToGlobal={}",
            segment(subject),
            default_to_global
        );
        let resp: ConfigResponse = self.request(Method::GET, &path, None::<&()>).await?;
        Ok(resp.compatibility_level)
    }

    /// Set the compatibility level of `subject`; returns the level the
    /// registry accepted.
    pub async fn change_subject_compatibility_level(
        &self,
        subject: &str,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityLevel, RegistryError> {
        let body = ConfigChange {
            compatibility: level,
        };
        let path = format!("/config/{}", segment(subject));
        let resp: ConfigChange = self.request(Method::PUT, &path, Some(&body)).await?;
        Ok(resp.compatibility)
    }

    // -- subjects -----------------------------------------------------------

    pub async fn get_subjects(&self) -> Result<Vec<String>, RegistryError> {
        self.request(Method::GET, "/subjects", None::<&()>).await
    }

    /// Subjects including soft-deleted ones.
    pub async fn get_subjects_including_deleted(&self) -> Result<Vec<String>, RegistryError> {
        self.request(Method::GET, "/subjects?deleted=true", None::<&()>)
            .await
    }

    /// Delete `subject`; returns the versions removed.
    ///
    /// With `permanent`, a hard delete is issued after the soft delete
    /// succeeds.
    pub async fn delete_subject(
        &self,
        subject: &str,
        permanent: bool,
    ) -> Result<Vec<u32>, RegistryError> {
        let path = format!("/subjects/{}", segment(subject));
        self.delete(&path, permanent).await
    }

    /// Delete one version of `subject`; returns the version removed.
    pub async fn delete_subject_by_version(
        &self,
        subject: &str,
        version: u32,
        permanent: bool,
    ) -> Result<u32, RegistryError> {
        let path = format!("/subjects/{}/versions/{}", segment(subject), version);
        self.delete(&path, permanent).await
    }

    // -- internals ----------------------------------------------------------

    async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        permanent: bool,
    ) -> Result<T, RegistryError> {
        let deleted: T = self.request(Method::DELETE, path, None::<&()>).await?;
        if permanent {
            let hard = format!("{}?permanent=true", path);
            self.send(Method::DELETE, &hard, None::<&()>).await?;
        }
        Ok(deleted)
    }

    /// Compile the codec eagerly when enabled and wrap for sharing.
    fn materialize(&self, schema: Schema) -> Result<Arc<Schema>, RegistryError> {
        if self.codec_creation_enabled() && schema.schema_type() == SchemaType::Avro {
            schema.codec()?;
        }
        Ok(Arc::new(schema))
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, RegistryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send(method, path, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, RegistryError>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;
        self.inner
            .dispatcher
            .send(&self.cancel, method, path, body)
            .await
    }
}

impl std::fmt::Debug for SchemaRegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistryClient")
            .field("url", &self.inner.dispatcher.base_url())
            .field("caching_enabled", &self.caching_enabled())
            .field("cache_latest", &self.cache_latest())
            .field("codec_creation_enabled", &self.codec_creation_enabled())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
