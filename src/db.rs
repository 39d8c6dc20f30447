// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

pub const DB_ENV: &str = "SAVINGSDESK_DB";

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Savingsdesk", "savingsdesk"));

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("savingsdesk.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS counters(
        name TEXT PRIMARY KEY,
        seq INTEGER NOT NULL
    );

    -- every lookup reference table, discriminated by kind
    CREATE TABLE IF NOT EXISTS lookups(
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        data TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ACTIVE',
        created_by TEXT NOT NULL,
        created_on TEXT NOT NULL,
        modified_by TEXT NOT NULL,
        modified_on TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_lookups_kind ON lookups(kind);

    CREATE TABLE IF NOT EXISTS platforms(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        pool TEXT NOT NULL CHECK(pool IN ('DIRECT','COMMON')),
        platform_group TEXT,
        functional_group TEXT
    );

    CREATE TABLE IF NOT EXISTS fg_platform_groups(
        functional_group_id TEXT NOT NULL,
        platform_group TEXT,
        UNIQUE(functional_group_id, platform_group)
    );

    CREATE TABLE IF NOT EXISTS platform_monthly_units(
        platform_id TEXT NOT NULL,
        month TEXT NOT NULL,
        units TEXT NOT NULL,
        UNIQUE(platform_id, month)
    );

    CREATE TABLE IF NOT EXISTS projects(
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL UNIQUE,
        project_number INTEGER,
        metadata TEXT NOT NULL,
        fixed_cost_mode TEXT NOT NULL DEFAULT 'MANUAL',
        created_by TEXT NOT NULL,
        created_on TEXT NOT NULL,
        modified_by TEXT NOT NULL,
        modified_on TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS legacy_projects(
        id TEXT PRIMARY KEY,
        project_id TEXT,
        data TEXT NOT NULL,
        imported_on TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_legacy_projects_pid ON legacy_projects(project_id);

    CREATE TABLE IF NOT EXISTS project_platforms(
        id TEXT PRIMARY KEY,
        project_ref TEXT NOT NULL,
        platform_ref_id TEXT,
        platform_name TEXT,
        unit_cost TEXT NOT NULL DEFAULT '0',
        total_volume TEXT NOT NULL DEFAULT '0',
        annualized_savings TEXT NOT NULL DEFAULT '0',
        FOREIGN KEY(project_ref) REFERENCES projects(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_project_platforms_ref ON project_platforms(project_ref);

    CREATE TABLE IF NOT EXISTS project_fixed_cost_savings(
        project_ref TEXT NOT NULL,
        month TEXT NOT NULL, -- YYYY-MM
        savings TEXT NOT NULL,
        UNIQUE(project_ref, month),
        FOREIGN KEY(project_ref) REFERENCES projects(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS blobs(
        id TEXT PRIMARY KEY,
        content BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_documents(
        id TEXT PRIMARY KEY,
        project_ref TEXT NOT NULL,
        doc_type TEXT NOT NULL,
        file_name TEXT NOT NULL,
        uploaded_by TEXT NOT NULL,
        uploaded_on TEXT NOT NULL,
        blob_id TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_project_documents_ref ON project_documents(project_ref);

    CREATE TABLE IF NOT EXISTS change_requests(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id TEXT NOT NULL,
        project_desc TEXT,
        status TEXT NOT NULL CHECK(status IN ('SUBMITTED','APPROVED','REJECTED')),
        reason_code TEXT,
        comment_code TEXT,
        annual_impact TEXT NOT NULL DEFAULT '0',
        year1_impact TEXT NOT NULL DEFAULT '0',
        year2_impact TEXT NOT NULL DEFAULT '0',
        created_on TEXT NOT NULL,
        approved_on TEXT,
        created_by TEXT NOT NULL,
        updated_by TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_change_requests_project ON change_requests(project_id);

    CREATE TABLE IF NOT EXISTS change_request_fields(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        change_request_id INTEGER NOT NULL,
        field_name TEXT NOT NULL,
        original_value TEXT,
        requested_value TEXT,
        annual_impact TEXT NOT NULL DEFAULT '0',
        year1_impact TEXT NOT NULL DEFAULT '0',
        year2_impact TEXT NOT NULL DEFAULT '0',
        reason_code TEXT,
        comment_code TEXT,
        FOREIGN KEY(change_request_id) REFERENCES change_requests(id) ON DELETE CASCADE
    );
    "#,
    )
}
