// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use apache_avro::types::Value as AvroValue;
use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// SchemaType
// ---------------------------------------------------------------------------

/// Schema language of a registered definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    /// Apache Avro. The registry default; omitted from outgoing requests.
    #[default]
    Avro,
    /// JSON Schema.
    Json,
    /// Protocol Buffers.
    Protobuf,
}

impl SchemaType {
    /// Wire name (`AVRO`, `JSON`, `PROTOBUF`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Avro => "AVRO",
            SchemaType::Json => "JSON",
            SchemaType::Protobuf => "PROTOBUF",
        }
    }

    /// Value sent in the `schemaType` request field.
    ///
    /// Avro is left out so that older registries keep accepting the request.
    pub(crate) fn request_value(self) -> Option<SchemaType> {
        match self {
            SchemaType::Avro => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVRO" => Ok(SchemaType::Avro),
            "JSON" => Ok(SchemaType::Json),
            "PROTOBUF" => Ok(SchemaType::Protobuf),
            _ => Err(RegistryError::InvalidSchemaType(s.to_string())),
        }
    }
}

/// Prepare schema text for registration or lookup.
///
/// Avro and JSON definitions have their line breaks (`\n` or `\r\n`) folded
/// into single spaces. Protobuf text is passed through untouched.
pub(crate) fn normalize_schema(schema: &str, schema_type: SchemaType) -> Cow<'_, str> {
    match schema_type {
        SchemaType::Avro | SchemaType::Json if schema.contains('\n') => {
            Cow::Owned(schema.replace("\r\n", " ").replace('\n', " "))
        }
        _ => Cow::Borrowed(schema),
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Version selector within a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Whatever the registry currently considers the newest version.
    Latest,
    /// An explicit version number.
    Number(u32),
}

impl Version {
    pub fn is_latest(&self) -> bool {
        matches!(self, Version::Latest)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Latest => f.write_str("latest"),
            Version::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<u32> for Version {
    fn from(n: u32) -> Self {
        Version::Number(n)
    }
}

impl FromStr for Version {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Version::Latest);
        }
        s.parse::<u32>()
            .map(Version::Number)
            .map_err(|_| RegistryError::InvalidVersion(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// Named dependency of a schema onto a version of another subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Import name (Protobuf import path, JSON `$ref`, Avro full name).
    pub name: String,
    /// Subject holding the referenced schema.
    pub subject: String,
    /// Version of the referenced schema.
    pub version: u32,
}

impl Reference {
    pub fn new(name: impl Into<String>, subject: impl Into<String>, version: u32) -> Self {
        Reference {
            name: name.into(),
            subject: subject.into(),
            version,
        }
    }
}

// ---------------------------------------------------------------------------
// AvroCodec
// ---------------------------------------------------------------------------

/// Compiled Avro schema able to encode and decode single datums.
#[derive(Debug)]
pub struct AvroCodec {
    schema: apache_avro::Schema,
}

impl AvroCodec {
    /// Compile an Avro schema definition.
    pub fn compile(definition: &str) -> Result<Self, RegistryError> {
        let schema = apache_avro::Schema::parse_str(definition)?;
        Ok(AvroCodec { schema })
    }

    /// The parsed Avro schema.
    pub fn schema(&self) -> &apache_avro::Schema {
        &self.schema
    }

    /// Encode a value as an Avro binary datum (no container header).
    pub fn encode<T: Into<AvroValue>>(&self, value: T) -> Result<Vec<u8>, RegistryError> {
        Ok(apache_avro::to_avro_datum(&self.schema, value)?)
    }

    /// Decode an Avro binary datum written with this schema.
    pub fn decode(&self, mut bytes: &[u8]) -> Result<AvroValue, RegistryError> {
        Ok(apache_avro::from_avro_datum(&self.schema, &mut bytes, None)?)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A schema as returned by the registry.
///
/// The identity fields never change after construction. The Avro codec and
/// the JSON Schema validator are compiled on first access and memoized; two
/// threads racing on first access may both compile, and the last one to
/// finish replaces the slot with an equivalent object.
pub struct Schema {
    id: u32,
    schema: String,
    schema_type: SchemaType,
    version: u32,
    references: Vec<Reference>,
    codec: ArcSwapOption<AvroCodec>,
    json_schema: ArcSwapOption<jsonschema::Validator>,
}

impl Schema {
    /// Build a schema directly (tests, offline tooling).
    pub fn new(
        id: u32,
        schema: impl Into<String>,
        schema_type: SchemaType,
        version: u32,
        references: Vec<Reference>,
    ) -> Result<Self, RegistryError> {
        let schema = schema.into();
        if schema.is_empty() {
            return Err(RegistryError::EmptySchema);
        }
        Ok(Self::from_parts(id, schema, schema_type, version, references))
    }

    fn from_parts(
        id: u32,
        schema: String,
        schema_type: SchemaType,
        version: u32,
        references: Vec<Reference>,
    ) -> Self {
        Schema {
            id,
            schema,
            schema_type,
            version,
            references,
            codec: ArcSwapOption::empty(),
            json_schema: ArcSwapOption::empty(),
        }
    }

    /// Build from a registry response. `id` overrides the response id for
    /// endpoints that do not echo it back.
    pub(crate) fn from_response(resp: SchemaResponse, id: Option<u32>) -> Self {
        Self::from_parts(
            id.unwrap_or(resp.id),
            resp.schema,
            resp.schema_type.unwrap_or_default(),
            resp.version,
            resp.references.unwrap_or_default(),
        )
    }

    /// Registry-assigned global id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Raw schema definition.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    /// Version within the subject (0 when the registry did not report it).
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Avro codec for this schema, compiled on first use.
    pub fn codec(&self) -> Result<Arc<AvroCodec>, RegistryError> {
        if let Some(codec) = self.codec.load_full() {
            return Ok(codec);
        }
        let codec = Arc::new(AvroCodec::compile(&self.schema)?);
        self.codec.store(Some(Arc::clone(&codec)));
        Ok(codec)
    }

    /// JSON Schema validator for this schema, compiled on first use.
    pub fn json_schema(&self) -> Result<Arc<jsonschema::Validator>, RegistryError> {
        if let Some(validator) = self.json_schema.load_full() {
            return Ok(validator);
        }
        let document: serde_json::Value = serde_json::from_str(&self.schema)?;
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| RegistryError::JsonSchema(e.to_string()))?;
        let validator = Arc::new(validator);
        self.json_schema.store(Some(Arc::clone(&validator)));
        Ok(validator)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.schema == other.schema
            && self.schema_type == other.schema_type
            && self.version == other.version
            && self.references == other.references
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("schema_type", &self.schema_type)
            .field("version", &self.version)
            .field("references", &self.references)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Wire documents
// ---------------------------------------------------------------------------

/// Body of register, lookup and compatibility requests.
#[derive(Debug, Serialize)]
pub(crate) struct SchemaRequest<'a> {
    pub schema: &'a str,
    #[serde(rename = "schemaType", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "<[Reference]>::is_empty")]
    pub references: &'a [Reference],
}

impl<'a> SchemaRequest<'a> {
    pub fn new(schema: &'a str, schema_type: SchemaType, references: &'a [Reference]) -> Self {
        SchemaRequest {
            schema,
            schema_type: schema_type.request_value(),
            references,
        }
    }
}

/// Schema document returned by the registry. Every field may be absent
/// depending on the endpoint (registration only returns `id`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SchemaResponse {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub schema: String,
    #[serde(default, rename = "schemaType")]
    pub schema_type: Option<SchemaType>,
    #[serde(default)]
    pub references: Option<Vec<Reference>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
