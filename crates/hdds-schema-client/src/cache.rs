// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dual-keyed schema cache.
//!
//! Two maps, each behind its own lock:
//!
//! ```text
//!   by id                 id -> Arc<Schema>
//!   by subject+version    (subject, Version) -> Arc<Schema>
//! ```
//!
//! A registration writes both maps; a read of one map never waits on a
//! writer of the other. Entries are never evicted, only replaced or dropped
//! wholesale by [`SchemaCache::reset`]. Registry ids and versions are
//! immutable once assigned, so entries cannot go stale, with the single
//! exception of `latest` which callers gate separately.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::registry::{Schema, Version};

type SubjectKey = (String, Version);

/// Schema cache shared by all clones of a client.
#[derive(Default)]
pub struct SchemaCache {
    by_id: RwLock<HashMap<u32, Arc<Schema>>>,
    by_subject: RwLock<HashMap<SubjectKey, Arc<Schema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_by_id(&self, id: u32) -> Option<Arc<Schema>> {
        self.by_id.read().get(&id).cloned()
    }

    pub fn put_by_id(&self, id: u32, schema: Arc<Schema>) {
        self.by_id.write().insert(id, schema);
    }

    pub fn get_by_version(&self, subject: &str, version: Version) -> Option<Arc<Schema>> {
        // Owned key needed for the tuple lookup.
        self.by_subject
            .read()
            .get(&(subject.to_string(), version))
            .cloned()
    }

    pub fn put_by_version(&self, subject: &str, version: Version, schema: Arc<Schema>) {
        self.by_subject
            .write()
            .insert((subject.to_string(), version), schema);
    }

    /// Index a schema under its id and under `subject` at its own version.
    ///
    /// Version 0 means the registry did not report one (by-id responses);
    /// such schemas are indexed by id only.
    pub fn put_both(&self, subject: &str, schema: &Arc<Schema>) {
        if schema.version() != 0 {
            self.put_by_version(subject, Version::Number(schema.version()), Arc::clone(schema));
        }
        self.put_by_id(schema.id(), Arc::clone(schema));
    }

    /// Drop every entry from both maps.
    ///
    /// Both write locks are held together so no reader observes one map
    /// cleared and the other still populated.
    pub fn reset(&self) {
        let mut by_id = self.by_id.write();
        let mut by_subject = self.by_subject.write();
        by_id.clear();
        by_subject.clear();
    }

    /// Number of entries in the (by id, by subject+version) maps.
    pub fn len(&self) -> (usize, usize) {
        (self.by_id.read().len(), self.by_subject.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
