// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::TokenProvider;
use crate::client::SchemaRegistryClient;
use crate::compatibility::CompatibilityLevel;
use crate::error::RegistryError;
use crate::registry::{Reference, Schema, SchemaType, Version};

// ---------------------------------------------------------------------------
// SchemaRegistryApi
// ---------------------------------------------------------------------------

/// Object-safe view of the registry operations.
///
/// Application code that only needs to talk to a registry can depend on
/// `Arc<dyn SchemaRegistryApi>` and swap in a fake in tests.
///
/// REST mapping:
///   GET    /schemas/ids/{id}                          -> `get_schema`
///   GET    /subjects/{subject}/versions/{version}     -> `get_schema_by_version`
///                                                     `get_latest_schema`
///   GET    /subjects/{subject}/versions               -> `get_schema_versions`
///   POST   /subjects/{subject}/versions               -> `create_schema`
///   POST   /subjects/{subject}                        -> `lookup_schema`
///   POST   /compatibility/subjects/{s}/versions/{v}   -> `is_schema_compatible`
///   GET    /config, /config/{subject}                 -> `get_*compatibility_level`
///   PUT    /config/{subject}                          -> `change_subject_compatibility_level`
///   GET    /subjects                                  -> `get_subjects*`
///   DELETE /subjects/{subject}[/versions/{version}]   -> `delete_subject*`
///
/// The synchronous methods reconfigure the client without touching the
/// network. Clones and cancellation handles share that configuration.
#[async_trait]
pub trait SchemaRegistryApi: Send + Sync {
    async fn get_schema(&self, id: u32) -> Result<Arc<Schema>, RegistryError>;

    async fn get_latest_schema(&self, subject: &str) -> Result<Arc<Schema>, RegistryError>;

    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Arc<Schema>, RegistryError>;

    async fn get_schema_versions(&self, subject: &str) -> Result<Vec<u32>, RegistryError>;

    async fn create_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<Arc<Schema>, RegistryError>;

    async fn lookup_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<Arc<Schema>, RegistryError>;

    async fn is_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
        version: Version,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<bool, RegistryError>;

    async fn get_global_compatibility_level(&self) -> Result<CompatibilityLevel, RegistryError>;

    async fn get_compatibility_level(
        &self,
        subject: &str,
        default_to_global: bool,
    ) -> Result<CompatibilityLevel, RegistryError>;

    async fn change_subject_compatibility_level(
        &self,
        subject: &str,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityLevel, RegistryError>;

    async fn get_subjects(&self) -> Result<Vec<String>, RegistryError>;

    async fn get_subjects_including_deleted(&self) -> Result<Vec<String>, RegistryError>;

    async fn delete_subject(
        &self,
        subject: &str,
        permanent: bool,
    ) -> Result<Vec<u32>, RegistryError>;

    async fn delete_subject_by_version(
        &self,
        subject: &str,
        version: u32,
        permanent: bool,
    ) -> Result<u32, RegistryError>;

    // -- configuration --

    fn set_credentials(&self, username: &str, password: &str);

    fn set_bearer_token(&self, provider: Arc<dyn TokenProvider>);

    fn clear_credentials(&self);

    fn set_timeout(&self, timeout: Duration);

    fn timeout(&self) -> Duration;

    fn set_caching_enabled(&self, value: bool);

    fn caching_enabled(&self) -> bool;

    fn set_cache_latest(&self, value: bool);

    fn cache_latest(&self) -> bool;

    fn set_codec_creation_enabled(&self, value: bool);

    fn codec_creation_enabled(&self) -> bool;

    fn reset_cache(&self);
}

#[async_trait]
impl SchemaRegistryApi for SchemaRegistryClient {
    async fn get_schema(&self, id: u32) -> Result<Arc<Schema>, RegistryError> {
        SchemaRegistryClient::get_schema(self, id).await
    }

    async fn get_latest_schema(&self, subject: &str) -> Result<Arc<Schema>, RegistryError> {
        SchemaRegistryClient::get_latest_schema(self, subject).await
    }

    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Arc<Schema>, RegistryError> {
        SchemaRegistryClient::get_schema_by_version(self, subject, version).await
    }

    async fn get_schema_versions(&self, subject: &str) -> Result<Vec<u32>, RegistryError> {
        SchemaRegistryClient::get_schema_versions(self, subject).await
    }

    async fn create_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<Arc<Schema>, RegistryError> {
        SchemaRegistryClient::create_schema(self, subject, schema, schema_type, references).await
    }

    async fn lookup_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<Arc<Schema>, RegistryError> {
        SchemaRegistryClient::lookup_schema(self, subject, schema, schema_type, references).await
    }

    async fn is_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
        version: Version,
        schema_type: SchemaType,
        references: &[Reference],
    ) -> Result<bool, RegistryError> {
        SchemaRegistryClient::is_schema_compatible(
            self,
            subject,
            schema,
            version,
            schema_type,
            references,
        )
        .await
    }

    async fn get_global_compatibility_level(&self) -> Result<CompatibilityLevel, RegistryError> {
        SchemaRegistryClient::get_global_compatibility_level(self).await
    }

    async fn get_compatibility_level(
        &self,
        subject: &str,
        default_to_global: bool,
    ) -> Result<CompatibilityLevel, RegistryError> {
        SchemaRegistryClient::get_compatibility_level(self, subject, default_to_global).await
    }

    async fn change_subject_compatibility_level(
        &self,
        subject: &str,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityLevel, RegistryError> {
        SchemaRegistryClient::change_subject_compatibility_level(self, subject, level).await
    }

    async fn get_subjects(&self) -> Result<Vec<String>, RegistryError> {
        SchemaRegistryClient::get_subjects(self).await
    }

    async fn get_subjects_including_deleted(&self) -> Result<Vec<String>, RegistryError> {
        SchemaRegistryClient::get_subjects_including_deleted(self).await
    }

    async fn delete_subject(
        &self,
        subject: &str,
        permanent: bool,
    ) -> Result<Vec<u32>, RegistryError> {
        SchemaRegistryClient::delete_subject(self, subject, permanent).await
    }

    async fn delete_subject_by_version(
        &self,
        subject: &str,
        version: u32,
        permanent: bool,
    ) -> Result<u32, RegistryError> {
        SchemaRegistryClient::delete_subject_by_version(self, subject, version, permanent).await
    }

    fn set_credentials(&self, username: &str, password: &str) {
        SchemaRegistryClient::set_credentials(self, username, password);
    }

    fn set_bearer_token(&self, provider: Arc<dyn TokenProvider>) {
        SchemaRegistryClient::set_bearer_token(self, provider);
    }

    fn clear_credentials(&self) {
        SchemaRegistryClient::clear_credentials(self);
    }

    fn set_timeout(&self, timeout: Duration) {
        SchemaRegistryClient::set_timeout(self, timeout);
    }

    fn timeout(&self) -> Duration {
        SchemaRegistryClient::timeout(self)
    }

    fn set_caching_enabled(&self, value: bool) {
        SchemaRegistryClient::set_caching_enabled(self, value);
    }

    fn caching_enabled(&self) -> bool {
        SchemaRegistryClient::caching_enabled(self)
    }

    fn set_cache_latest(&self, value: bool) {
        SchemaRegistryClient::set_cache_latest(self, value);
    }

    fn cache_latest(&self) -> bool {
        SchemaRegistryClient::cache_latest(self)
    }

    fn set_codec_creation_enabled(&self, value: bool) {
        SchemaRegistryClient::set_codec_creation_enabled(self, value);
    }

    fn codec_creation_enabled(&self) -> bool {
        SchemaRegistryClient::codec_creation_enabled(self)
    }

    fn reset_cache(&self) {
        SchemaRegistryClient::reset_cache(self);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
