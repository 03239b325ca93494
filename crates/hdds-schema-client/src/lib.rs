// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client for Confluent-compatible schema registries.
//!
//! Resolves schemas by id and by subject+version, registers and looks up
//! schemas, checks compatibility, manages compatibility levels and deletes
//! subjects. Avoids redundant round trips with a dual-keyed cache and
//! protects the registry with a bounded concurrency gate.
//!
//! # Features
//!
//! - **Caching**: by id and by subject+version; `latest` cached only on request
//! - **Concurrency gate**: at most N requests in flight per client (default 16)
//! - **Authentication**: HTTP Basic or bearer tokens from a [`TokenProvider`]
//! - **Cancellation**: every call honors the client's [`CancellationToken`]
//! - **Codecs**: lazily compiled Avro codecs and JSON Schema validators
//!
//! # Architecture
//!
//! ```text
//!   SchemaRegistryClient
//!        |  cache hit?
//!        +-----------------> SchemaCache (by id | by subject+version)
//!        |  miss
//!        v
//!   RequestDispatcher (gate -> credentials -> HTTP)
//!        |
//!        v
//!   Schema registry REST API
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hdds_schema_client::{SchemaRegistryClient, SchemaType};
//!
//! # async fn run() -> Result<(), hdds_schema_client::RegistryError> {
//! let client = SchemaRegistryClient::new("http://localhost:8081")?;
//! let created = client
//!     .create_schema("orders-value", r#"{"type": "string"}"#, SchemaType::Avro, &[])
//!     .await?;
//! let fetched = client.get_schema(created.id()).await?;
//! assert_eq!(created.schema(), fetched.schema());
//! # Ok(())
//! # }
//! ```
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod compatibility;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;

pub use api::SchemaRegistryApi;
pub use auth::{AuthScheme, BasicAuth, BearerAuth, StaticToken, TokenProvider};
pub use cache::SchemaCache;
pub use client::SchemaRegistryClient;
pub use compatibility::CompatibilityLevel;
pub use config::{BasicAuthConfig, ClientConfig, ConfigError};
pub use error::{BoxError, RegistryError};
pub use registry::{AvroCodec, Reference, Schema, SchemaType, Version};
pub use tokio_util::sync::CancellationToken;
