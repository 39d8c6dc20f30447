// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Lookup reference tables stored as JSON documents, one kind per registry entry.

use crate::cache::TtlCache;
use crate::error::{AppError, Result};
use crate::ids::new_object_id;
use crate::registry::{DeletePolicy, EntityKind};
use crate::utils::now_stamp;
use rusqlite::{Connection, params};
use serde::Serialize;
use serde_json::{Map, Value};

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_INACTIVE: &str = "INACTIVE";

pub type LookupCache = TtlCache<EntityKind, Vec<LookupDoc>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupDoc {
    pub id: String,
    pub kind: EntityKind,
    pub status: String,
    pub data: Map<String, Value>,
}

impl LookupDoc {
    pub fn is_active(&self) -> bool {
        !self.status.eq_ignore_ascii_case(STATUS_INACTIVE)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Display label: the kind's label field, then common naming fields,
    /// then the id.
    pub fn label(&self) -> String {
        [self.kind.label_field(), "name", "displayName", "title", "label", "description"]
            .iter()
            .find_map(|f| self.text(f).filter(|s| !s.trim().is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Lookup store bound to one connection, cache and audit actor.
pub struct Lookups<'a> {
    conn: &'a Connection,
    cache: &'a LookupCache,
    actor: &'a str,
}

impl<'a> Lookups<'a> {
    pub fn new(conn: &'a Connection, cache: &'a LookupCache, actor: &'a str) -> Self {
        Self { conn, cache, actor }
    }

    /// Every document of `kind`, inactive ones included. Served from the cache.
    pub fn all(&self, kind: EntityKind) -> Result<Vec<LookupDoc>> {
        self.cache.get_or_try_insert(kind, || load_kind(self.conn, kind))
    }

    pub fn list(&self, kind: EntityKind, include_inactive: bool) -> Result<Vec<LookupDoc>> {
        let docs = self.all(kind)?;
        Ok(docs
            .into_iter()
            .filter(|d| include_inactive || d.is_active())
            .collect())
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Result<LookupDoc> {
        self.all(kind)?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::not_found(format!("{} '{}'", kind.display_name(), id)))
    }

    pub fn create(&self, kind: EntityKind, data: Map<String, Value>) -> Result<String> {
        let id = insert_doc(self.conn, kind, data, self.actor, None)?;
        self.cache.clear();
        Ok(id)
    }

    /// Merge `patch` into an existing document.
    pub fn update(&self, kind: EntityKind, id: &str, patch: Map<String, Value>) -> Result<()> {
        let mut doc = self.get(kind, id)?;
        for (k, v) in patch {
            doc.data.insert(k, v);
        }
        let status = doc
            .text(kind.status_field())
            .map(str::to_string)
            .unwrap_or(doc.status);
        let audit = kind.audit_fields();
        let now = now_stamp();
        doc.data
            .insert(audit.modified_by.into(), Value::String(self.actor.to_string()));
        doc.data.insert(audit.modified_on.into(), Value::String(now.clone()));

        self.conn.execute(
            "UPDATE lookups SET data=?1, status=?2, modified_by=?3, modified_on=?4
             WHERE id=?5 AND kind=?6",
            params![
                serde_json::to_string(&doc.data)?,
                status,
                self.actor,
                now,
                id,
                kind.collection()
            ],
        )?;
        self.cache.clear();
        Ok(())
    }

    /// Apply the kind's delete policy: status flip or physical removal.
    pub fn remove(&self, kind: EntityKind, id: &str) -> Result<DeletePolicy> {
        let policy = kind.delete_policy();
        match policy {
            DeletePolicy::Soft => {
                let mut patch = Map::new();
                patch.insert(
                    kind.status_field().to_string(),
                    Value::String(STATUS_INACTIVE.into()),
                );
                self.update(kind, id, patch)?;
            }
            DeletePolicy::Hard => {
                let n = self.conn.execute(
                    "DELETE FROM lookups WHERE id=?1 AND kind=?2",
                    params![id, kind.collection()],
                )?;
                if n == 0 {
                    return Err(AppError::not_found(format!(
                        "{} '{}'",
                        kind.display_name(),
                        id
                    )));
                }
                self.cache.clear();
            }
        }
        Ok(policy)
    }

    /// Insert a batch of documents atomically, stamping each with `file_name`.
    pub fn import(
        &self,
        kind: EntityKind,
        records: Vec<Map<String, Value>>,
        file_name: &str,
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut n = 0;
        for data in records {
            insert_doc(&tx, kind, data, self.actor, Some(file_name))?;
            n += 1;
        }
        tx.commit()?;
        self.cache.clear();
        log::info!("Imported {} {} record(s) from {}", n, kind, file_name);
        Ok(n)
    }
}

fn insert_doc(
    conn: &Connection,
    kind: EntityKind,
    mut data: Map<String, Value>,
    actor: &str,
    file_name: Option<&str>,
) -> Result<String> {
    let label_ok = data
        .get(kind.label_field())
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !label_ok {
        return Err(AppError::validation(format!(
            "{} requires '{}'",
            kind.display_name(),
            kind.label_field()
        )));
    }

    let status = match data.get(kind.status_field()).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_uppercase(),
        _ => STATUS_ACTIVE.to_string(),
    };
    data.insert(kind.status_field().into(), Value::String(status.clone()));

    let audit = kind.audit_fields();
    let now = now_stamp();
    for (field, value) in [
        (audit.created_by, actor),
        (audit.created_on, now.as_str()),
        (audit.modified_by, actor),
        (audit.modified_on, now.as_str()),
    ] {
        data.insert(field.into(), Value::String(value.to_string()));
    }
    if let Some(f) = file_name {
        data.insert("file_name".into(), Value::String(f.to_string()));
    }

    let id = new_object_id(conn)?;
    conn.execute(
        "INSERT INTO lookups(id, kind, data, status, created_by, created_on, modified_by, modified_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?5, ?6)",
        params![
            id,
            kind.collection(),
            serde_json::to_string(&data)?,
            status,
            actor,
            now
        ],
    )?;
    Ok(id)
}

fn load_kind(conn: &Connection, kind: EntityKind) -> Result<Vec<LookupDoc>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, status, data FROM lookups WHERE kind=?1 ORDER BY created_on, id",
    )?;
    let rows = stmt.query_map(params![kind.collection()], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, status, raw) = row?;
        let data: Map<String, Value> = serde_json::from_str(&raw)?;
        out.push(LookupDoc {
            id,
            kind,
            status,
            data,
        });
    }
    log::debug!("Loaded {} {} document(s)", out.len(), kind);
    Ok(out)
}
