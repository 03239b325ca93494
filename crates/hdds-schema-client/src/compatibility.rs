// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// CompatibilityLevel
// ---------------------------------------------------------------------------

/// Registry-enforced policy governing which schema changes a subject accepts.
///
/// Compatibility is evaluated by the registry; the client only transports
/// the level and the boolean verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityLevel {
    /// No compatibility checks.
    None,
    /// New schema can read data written by the previous version.
    Backward,
    /// New schema can read data written by all previous versions.
    BackwardTransitive,
    /// Previous version can read data written by the new schema.
    Forward,
    /// All previous versions can read data written by the new schema.
    ForwardTransitive,
    /// Both backward and forward against the previous version.
    Full,
    /// Both backward and forward against all previous versions.
    FullTransitive,
}

impl CompatibilityLevel {
    /// Wire name of the level (e.g. `BACKWARD_TRANSITIVE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityLevel::None => "NONE",
            CompatibilityLevel::Backward => "BACKWARD",
            CompatibilityLevel::BackwardTransitive => "BACKWARD_TRANSITIVE",
            CompatibilityLevel::Forward => "FORWARD",
            CompatibilityLevel::ForwardTransitive => "FORWARD_TRANSITIVE",
            CompatibilityLevel::Full => "FULL",
            CompatibilityLevel::FullTransitive => "FULL_TRANSITIVE",
        }
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibilityLevel {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(CompatibilityLevel::None),
            "BACKWARD" => Ok(CompatibilityLevel::Backward),
            "BACKWARD_TRANSITIVE" => Ok(CompatibilityLevel::BackwardTransitive),
            "FORWARD" => Ok(CompatibilityLevel::Forward),
            "FORWARD_TRANSITIVE" => Ok(CompatibilityLevel::ForwardTransitive),
            "FULL" => Ok(CompatibilityLevel::Full),
            "FULL_TRANSITIVE" => Ok(CompatibilityLevel::FullTransitive),
            _ => Err(RegistryError::InvalidCompatibilityLevel(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire documents
// ---------------------------------------------------------------------------

/// `GET /config[/{subject}]` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ConfigResponse {
    #[serde(rename = "compatibilityLevel")]
    pub compatibility_level: CompatibilityLevel,
}

/// `PUT /config/{subject}` request and response.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ConfigChange {
    pub compatibility: CompatibilityLevel,
}

/// `POST /compatibility/...` response.
#[derive(Debug, Deserialize)]
pub(crate) struct CompatibilityResponse {
    pub is_compatible: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
