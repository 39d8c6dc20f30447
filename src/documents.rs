// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Project documents: metadata rows plus blob content.

use crate::error::{AppError, Result};
use crate::ids::new_object_id;
use crate::models::DocumentMeta;
use crate::utils::now_stamp;
use rusqlite::{Connection, OptionalExtension, params};

#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub doc_type: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Store the blob, then its metadata row. Both land on `conn`, so callers
/// inside a transaction get both or neither.
pub fn attach(
    conn: &Connection,
    project_ref: &str,
    upload: &DocumentUpload,
    actor: &str,
) -> Result<DocumentMeta> {
    if upload.file_name.trim().is_empty() {
        return Err(AppError::validation("document file name is required"));
    }
    let blob_id = new_object_id(conn)?;
    conn.execute(
        "INSERT INTO blobs(id, content) VALUES (?1, ?2)",
        params![blob_id, upload.content],
    )?;

    let meta = DocumentMeta {
        id: new_object_id(conn)?,
        project_ref: project_ref.to_string(),
        doc_type: upload.doc_type.trim().to_string(),
        file_name: upload.file_name.trim().to_string(),
        uploaded_by: actor.to_string(),
        uploaded_on: now_stamp(),
        blob_id: Some(blob_id),
    };
    conn.execute(
        "INSERT INTO project_documents(id, project_ref, doc_type, file_name, uploaded_by, uploaded_on, blob_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            meta.id,
            meta.project_ref,
            meta.doc_type,
            meta.file_name,
            meta.uploaded_by,
            meta.uploaded_on,
            meta.blob_id
        ],
    )?;
    Ok(meta)
}

fn row_to_meta(r: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentMeta> {
    Ok(DocumentMeta {
        id: r.get(0)?,
        project_ref: r.get(1)?,
        doc_type: r.get(2)?,
        file_name: r.get(3)?,
        uploaded_by: r.get(4)?,
        uploaded_on: r.get(5)?,
        blob_id: r.get(6)?,
    })
}

pub fn list(conn: &Connection, project_ref: &str) -> Result<Vec<DocumentMeta>> {
    let mut stmt = conn.prepare(
        "SELECT id, project_ref, doc_type, file_name, uploaded_by, uploaded_on, blob_id
         FROM project_documents WHERE project_ref=?1 ORDER BY uploaded_on, id",
    )?;
    let rows = stmt.query_map(params![project_ref], row_to_meta)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Metadata and content of one document.
pub fn fetch(conn: &Connection, id: &str) -> Result<(DocumentMeta, Vec<u8>)> {
    let meta = conn
        .query_row(
            "SELECT id, project_ref, doc_type, file_name, uploaded_by, uploaded_on, blob_id
             FROM project_documents WHERE id=?1",
            params![id],
            row_to_meta,
        )
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("document '{}'", id)))?;

    let blob_id = meta
        .blob_id
        .as_deref()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::validation(format!("document '{}' has no file reference", id)))?;
    let content: Vec<u8> = conn
        .query_row(
            "SELECT content FROM blobs WHERE id=?1",
            params![blob_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("file '{}'", blob_id)))?;
    Ok((meta, content))
}
