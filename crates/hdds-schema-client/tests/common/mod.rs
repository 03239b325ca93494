// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process registry used by the integration tests.
//!
//! Serves the Confluent REST subset the client speaks, records every request
//! (method, path with query, Authorization header, body) and tracks how many
//! requests are in flight at once.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub uri: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct Stored {
    id: u32,
    subject: String,
    version: u32,
    schema: String,
    schema_type: String,
    deleted: bool,
}

impl Stored {
    fn document(&self) -> Value {
        let mut doc = json!({
            "subject": self.subject,
            "version": self.version,
            "id": self.id,
            "schema": self.schema,
        });
        if self.schema_type != "AVRO" {
            doc["schemaType"] = json!(self.schema_type);
        }
        doc
    }
}

struct Store {
    schemas: Vec<Stored>,
    next_id: u32,
    global_level: String,
    subject_levels: HashMap<String, String>,
}

pub struct MockRegistry {
    store: Mutex<Store>,
    requests: Mutex<Vec<Recorded>>,
    bodies: Mutex<Vec<Value>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay_ms: AtomicU64,
}

impl MockRegistry {
    /// Start a registry on an ephemeral port; returns it with its base URL.
    pub async fn start() -> (Arc<MockRegistry>, String) {
        let mock = Arc::new(MockRegistry {
            store: Mutex::new(Store {
                schemas: Vec::new(),
                next_id: 1,
                global_level: "BACKWARD".to_string(),
                subject_levels: HashMap::new(),
            }),
            requests: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay_ms: AtomicU64::new(0),
        });

        let app = Router::new()
            .route("/schemas/ids/:id", get(schema_by_id))
            .route("/subjects", get(list_subjects))
            .route("/subjects/:subject", post(lookup).delete(delete_subject))
            .route(
                "/subjects/:subject/versions",
                get(list_versions).post(register),
            )
            .route(
                "/subjects/:subject/versions/:version",
                get(subject_version).delete(delete_version),
            )
            .route(
                "/compatibility/subjects/:subject/versions/:version",
                post(compatibility),
            )
            .route("/config", get(global_config))
            .route("/config/:subject", get(subject_config).put(put_config))
            .layer(middleware::from_fn_with_state(Arc::clone(&mock), track))
            .with_state(Arc::clone(&mock));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock registry");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock registry");
        });

        (mock, format!("http://{}", addr))
    }

    /// Store a schema directly, bypassing HTTP. Returns (id, version).
    pub fn insert(&self, subject: &str, schema: &str, schema_type: &str) -> (u32, u32) {
        let mut store = self.store.lock();
        store.register(subject, schema, schema_type)
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    /// Number of recorded requests matching `method` and exact `uri`.
    pub fn count(&self, method: &str, uri: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.uri == uri)
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.requests
            .lock()
            .last()
            .and_then(|r| r.authorization.clone())
    }

    /// JSON bodies of POST/PUT requests, in arrival order.
    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record_body(&self, body: &Bytes) -> Value {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        self.bodies.lock().push(value.clone());
        value
    }
}

impl Store {
    fn register(&mut self, subject: &str, schema: &str, schema_type: &str) -> (u32, u32) {
        if let Some(existing) = self.schemas.iter().find(|s| {
            s.subject == subject && !s.deleted && s.schema == schema && s.schema_type == schema_type
        }) {
            return (existing.id, existing.version);
        }

        // Identical definitions share one global id across subjects.
        let id = match self
            .schemas
            .iter()
            .find(|s| s.schema == schema && s.schema_type == schema_type)
        {
            Some(s) => s.id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        let version = self
            .schemas
            .iter()
            .filter(|s| s.subject == subject)
            .map(|s| s.version)
            .max()
            .unwrap_or(0)
            + 1;

        self.schemas.push(Stored {
            id,
            subject: subject.to_string(),
            version,
            schema: schema.to_string(),
            schema_type: schema_type.to_string(),
            deleted: false,
        });
        (id, version)
    }

    fn live(&self, subject: &str) -> impl Iterator<Item = &Stored> + '_ {
        let subject = subject.to_string();
        self.schemas
            .iter()
            .filter(move |s| s.subject == subject && !s.deleted)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn track(State(mock): State<Arc<MockRegistry>>, request: Request, next: Next) -> Response {
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    mock.requests.lock().push(Recorded {
        method: request.method().to_string(),
        uri,
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let now = mock.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    let _guard = InFlight(&mock.in_flight);
    mock.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let delay = mock.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    next.run(request).await
}

fn registry_error(status: StatusCode, code: i32, message: &str) -> Response {
    (
        status,
        Json(json!({"error_code": code, "message": message})),
    )
        .into_response()
}

fn request_type(body: &Value) -> String {
    body.get("schemaType")
        .and_then(Value::as_str)
        .unwrap_or("AVRO")
        .to_string()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn schema_by_id(State(mock): State<Arc<MockRegistry>>, Path(id): Path<u32>) -> Response {
    let store = mock.store.lock();
    match store.schemas.iter().find(|s| s.id == id) {
        Some(s) => {
            // By-id responses carry neither id nor version.
            let mut doc = json!({"schema": s.schema});
            if s.schema_type != "AVRO" {
                doc["schemaType"] = json!(s.schema_type);
            }
            Json(doc).into_response()
        }
        None => registry_error(StatusCode::NOT_FOUND, 40403, "Schema not found"),
    }
}

async fn subject_version(
    State(mock): State<Arc<MockRegistry>>,
    Path((subject, version)): Path<(String, String)>,
) -> Response {
    let store = mock.store.lock();
    let found = if version == "latest" {
        store.live(&subject).max_by_key(|s| s.version)
    } else {
        match version.parse::<u32>() {
            Ok(v) => store.live(&subject).find(|s| s.version == v),
            Err(_) => {
                return registry_error(StatusCode::UNPROCESSABLE_ENTITY, 42202, "Invalid version")
            }
        }
    };
    match found {
        Some(s) => Json(s.document()).into_response(),
        None => registry_error(StatusCode::NOT_FOUND, 40402, "Version not found"),
    }
}

async fn list_versions(
    State(mock): State<Arc<MockRegistry>>,
    Path(subject): Path<String>,
) -> Response {
    let store = mock.store.lock();
    let versions: Vec<u32> = store.live(&subject).map(|s| s.version).collect();
    if versions.is_empty() {
        return registry_error(StatusCode::NOT_FOUND, 40401, "Subject not found");
    }
    Json(versions).into_response()
}

async fn register(
    State(mock): State<Arc<MockRegistry>>,
    Path(subject): Path<String>,
    body: Bytes,
) -> Response {
    let body = mock.record_body(&body);
    let schema = body.get("schema").and_then(Value::as_str).unwrap_or("");
    if schema.is_empty() || schema == "invalid" {
        return registry_error(StatusCode::UNPROCESSABLE_ENTITY, 42201, "Invalid schema");
    }
    let (id, _) = mock
        .store
        .lock()
        .register(&subject, schema, &request_type(&body));
    Json(json!({"id": id})).into_response()
}

#[allow(clippy::let_and_return)] // Guard must outlive the iterator
async fn lookup(
    State(mock): State<Arc<MockRegistry>>,
    Path(subject): Path<String>,
    body: Bytes,
) -> Response {
    let body = mock.record_body(&body);
    let schema = body.get("schema").and_then(Value::as_str).unwrap_or("");
    let schema_type = request_type(&body);
    let store = mock.store.lock();
    let response = match store
        .live(&subject)
        .find(|s| s.schema == schema && s.schema_type == schema_type)
    {
        Some(s) => Json(s.document()).into_response(),
        None => registry_error(StatusCode::NOT_FOUND, 40403, "Schema not found"),
    };
    response
}

async fn compatibility(
    State(mock): State<Arc<MockRegistry>>,
    Path((_subject, _version)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let body = mock.record_body(&body);
    let schema = body.get("schema").and_then(Value::as_str).unwrap_or("");
    Json(json!({"is_compatible": !schema.contains("incompatible")})).into_response()
}

async fn global_config(State(mock): State<Arc<MockRegistry>>) -> Response {
    let level = mock.store.lock().global_level.clone();
    Json(json!({"compatibilityLevel": level})).into_response()
}

async fn subject_config(
    State(mock): State<Arc<MockRegistry>>,
    Path(subject): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = mock.store.lock();
    let default_to_global = query.get("defaultToGlobal").map(String::as_str) == Some("true");
    match store.subject_levels.get(&subject) {
        Some(level) => Json(json!({"compatibilityLevel": level})).into_response(),
        None if default_to_global => {
            Json(json!({"compatibilityLevel": store.global_level})).into_response()
        }
        None => registry_error(
            StatusCode::NOT_FOUND,
            40408,
            "Subject does not have subject-level compatibility configured",
        ),
    }
}

async fn put_config(
    State(mock): State<Arc<MockRegistry>>,
    Path(subject): Path<String>,
    body: Bytes,
) -> Response {
    let body = mock.record_body(&body);
    let Some(level) = body.get("compatibility").and_then(Value::as_str) else {
        return registry_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            42203,
            "Invalid compatibility level",
        );
    };
    mock.store
        .lock()
        .subject_levels
        .insert(subject, level.to_string());
    Json(json!({"compatibility": level})).into_response()
}

async fn list_subjects(
    State(mock): State<Arc<MockRegistry>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let include_deleted = query.get("deleted").map(String::as_str) == Some("true");
    let store = mock.store.lock();
    let subjects: BTreeSet<&str> = store
        .schemas
        .iter()
        .filter(|s| include_deleted || !s.deleted)
        .map(|s| s.subject.as_str())
        .collect();
    Json(subjects).into_response()
}

async fn delete_subject(
    State(mock): State<Arc<MockRegistry>>,
    Path(subject): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let permanent = query.get("permanent").map(String::as_str) == Some("true");
    let mut store = mock.store.lock();
    let versions: Vec<u32> = store
        .schemas
        .iter()
        .filter(|s| s.subject == subject && s.deleted == permanent)
        .map(|s| s.version)
        .collect();
    if versions.is_empty() {
        return if permanent {
            registry_error(StatusCode::NOT_FOUND, 40405, "Subject was not soft-deleted first")
        } else {
            registry_error(StatusCode::NOT_FOUND, 40401, "Subject not found")
        };
    }
    if permanent {
        store.schemas.retain(|s| s.subject != subject);
    } else {
        for s in store.schemas.iter_mut().filter(|s| s.subject == subject) {
            s.deleted = true;
        }
    }
    Json(versions).into_response()
}

async fn delete_version(
    State(mock): State<Arc<MockRegistry>>,
    Path((subject, version)): Path<(String, u32)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let permanent = query.get("permanent").map(String::as_str) == Some("true");
    let mut store = mock.store.lock();
    let Some(pos) = store
        .schemas
        .iter()
        .position(|s| s.subject == subject && s.version == version && s.deleted == permanent)
    else {
        return registry_error(StatusCode::NOT_FOUND, 40402, "Version not found");
    };
    if permanent {
        store.schemas.remove(pos);
    } else {
        store.schemas[pos].deleted = true;
    }
    Json(json!(version)).into_response()
}
