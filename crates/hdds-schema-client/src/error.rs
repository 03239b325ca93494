// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types returned by the schema registry client.

use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Boxed error produced by a [`TokenProvider`](crate::auth::TokenProvider).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the schema registry client.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Connection failure, timeout or other transport-level problem.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request or response body could not be (de)serialized.
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Structured error returned by the registry (`{error_code, message}`).
    #[error("schema registry error {code}: {message}")]
    Registry { code: i32, message: String },

    /// Non-2xx response whose body is not a registry error document.
    #[error("schema registry returned {status}")]
    Http { status: String },

    /// Schema type outside AVRO, JSON and PROTOBUF.
    #[error("invalid schema type '{0}'. valid values are Avro, Json, or Protobuf")]
    InvalidSchemaType(String),

    /// Version token that is neither `latest` nor a decimal number.
    #[error("invalid schema version '{0}'")]
    InvalidVersion(String),

    /// Compatibility level outside the registry's fixed set.
    #[error("invalid compatibility level '{0}'")]
    InvalidCompatibilityLevel(String),

    /// A schema was constructed with an empty definition.
    #[error("schema cannot be empty")]
    EmptySchema,

    /// The caller's cancellation token fired before the request completed.
    #[error("request cancelled")]
    Cancelled,

    /// The bearer token provider failed.
    #[error("token provider error: {0}")]
    Token(BoxError),

    /// The Avro definition could not be compiled into a codec.
    #[error("avro codec error: {0}")]
    Codec(#[from] apache_avro::Error),

    /// The JSON Schema definition could not be compiled.
    #[error("json schema error: {0}")]
    JsonSchema(String),

    /// Registry base URL could not be joined with a request path.
    #[error("invalid registry url: {0}")]
    InvalidUrl(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RegistryError {
    /// Registry error code, when the server returned a structured error.
    pub fn code(&self) -> Option<i32> {
        match self {
            RegistryError::Registry { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Registry error message, when the server returned a structured error.
    pub fn message(&self) -> Option<&str> {
        match self {
            RegistryError::Registry { message, .. } => Some(message),
            _ => None,
        }
    }

    /// True when the error originates from a cancelled request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RegistryError::Cancelled)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error_code: i32,
    #[serde(default)]
    message: String,
}

/// Map a non-2xx response body to a [`RegistryError`].
///
/// Falls back to the HTTP status line when the body is not a registry
/// error document.
pub(crate) fn from_response(status: reqwest::StatusCode, body: &[u8]) -> RegistryError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => RegistryError::Registry {
            code: err.error_code,
            message: err.message,
        },
        Err(_) => RegistryError::Http {
            status: status.to_string(),
        },
    }
}
