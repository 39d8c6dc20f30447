// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Named sequences, document ids and the project id scheme.

use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};

pub const PROJECT_NUMBER_COUNTER: &str = "projectNumber";
pub const PROJECT_NUMBER_START: i64 = 2447304;

const OBJECT_ID_COUNTER: &str = "objectId";

static OBJECT_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());

/// Monotonic value for a named counter. The first call yields `start`.
pub fn next_sequence(conn: &Connection, name: &str, start: i64) -> Result<i64> {
    let seq = conn.query_row(
        "INSERT INTO counters(name, seq) VALUES(?1, ?2)
         ON CONFLICT(name) DO UPDATE SET seq=seq+1
         RETURNING seq",
        params![name, start],
        |r| r.get(0),
    )?;
    Ok(seq)
}

/// 24 hex characters: seconds since epoch followed by a store-wide sequence.
pub fn new_object_id(conn: &Connection) -> Result<String> {
    let seq = next_sequence(conn, OBJECT_ID_COUNTER, 1)?;
    let ts = chrono::Utc::now().timestamp() as u32;
    Ok(format!("{:08x}{:016x}", ts, seq as u64))
}

pub fn is_object_id(s: &str) -> bool {
    OBJECT_ID_RE.is_match(s)
}

pub fn next_project_number(conn: &Connection) -> Result<i64> {
    next_sequence(conn, PROJECT_NUMBER_COUNTER, PROJECT_NUMBER_START)
}

/// Two upper-cased letters of the functional group name, then `YYMM`.
pub fn project_id_prefix(functional_group_name: &str, on: NaiveDate) -> String {
    let code: String = functional_group_name
        .trim()
        .chars()
        .take(2)
        .collect::<String>()
        .to_uppercase();
    format!("{}{:02}{:02}", code, on.year() % 100, on.month())
}

/// Next free id for `prefix`: the highest existing suffix plus one,
/// zero-padded to three digits.
pub fn next_project_id(conn: &Connection, prefix: &str) -> Result<String> {
    let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
    let last: Option<String> = conn
        .query_row(
            "SELECT project_id FROM projects WHERE project_id LIKE ?1 ESCAPE '\\'
             ORDER BY project_id DESC LIMIT 1",
            params![pattern],
            |r| r.get(0),
        )
        .optional()?;

    let next = last
        .as_deref()
        .and_then(|id| id.get(id.len().saturating_sub(3)..))
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    Ok(format!("{}{:03}", prefix, next))
}

pub fn project_id_exists(conn: &Connection, project_id: &str) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM projects WHERE project_id=?1
             UNION ALL SELECT 1 FROM legacy_projects WHERE project_id=?1
             LIMIT 1",
            params![project_id.trim()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}
