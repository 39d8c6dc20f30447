// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Change-request persistence and the SUBMITTED -> APPROVED/REJECTED machine.

use crate::error::{AppError, Result};
use crate::finance::Totals;
use crate::models::{ChangeRecord, ChangeRequest, ChangeStatus, FieldChange, ImpactTotals};
use crate::utils::{now_stamp, stored_decimal};
use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Everything needed to file one change request.
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub project_id: &'a str,
    pub project_desc: &'a str,
    pub reason_code: Option<&'a str>,
    pub comment_code: Option<&'a str>,
    pub changes: &'a [ChangeRecord],
    pub totals: ImpactTotals,
}

/// Annualized total plus the calendar-year buckets for `today`'s year and
/// the one after.
pub fn impact_from_totals(totals: &Totals, today: NaiveDate) -> ImpactTotals {
    let year = today.year();
    let bucket = |y: i32| totals.yearly.get(&y).copied().unwrap_or(Decimal::ZERO);
    ImpactTotals {
        annualized: totals.annualized,
        year1: bucket(year),
        year2: bucket(year + 1),
    }
}

/// Parent row and one child row per change, in a single transaction.
pub fn submit(conn: &mut Connection, actor: &str, sub: &Submission<'_>) -> Result<i64> {
    if sub.project_id.trim().is_empty() {
        return Err(AppError::validation("projectId is required"));
    }
    if sub.changes.is_empty() {
        return Err(AppError::validation("no changes to submit"));
    }

    let now = now_stamp();
    let impact = sub.totals;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO change_requests(project_id, project_desc, status, reason_code, comment_code,
            annual_impact, year1_impact, year2_impact, created_on, approved_on, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?10)",
        params![
            sub.project_id.trim(),
            sub.project_desc,
            ChangeStatus::Submitted.as_str(),
            sub.reason_code,
            sub.comment_code,
            impact.annualized.to_string(),
            impact.year1.to_string(),
            impact.year2.to_string(),
            now,
            actor
        ],
    )?;
    let id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO change_request_fields(change_request_id, field_name, original_value, requested_value,
                annual_impact, year1_impact, year2_impact, reason_code, comment_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for c in sub.changes {
            stmt.execute(params![
                id,
                c.field,
                c.old_value,
                c.new_value,
                impact.annualized.to_string(),
                impact.year1.to_string(),
                impact.year2.to_string(),
                sub.reason_code,
                sub.comment_code
            ])?;
        }
    }
    tx.commit()?;
    log::info!(
        "Submitted change request {} for {} with {} field change(s)",
        id,
        sub.project_id,
        sub.changes.len()
    );
    Ok(id)
}

fn dec(s: String, column: &str) -> Decimal {
    stored_decimal(&s, column)
}

const SELECT_PARENT: &str = "SELECT id, project_id, project_desc, status, reason_code, comment_code,
        annual_impact, year1_impact, year2_impact, created_on, approved_on
     FROM change_requests";

fn row_to_request(r: &rusqlite::Row<'_>) -> rusqlite::Result<ChangeRequest> {
    let status: String = r.get(3)?;
    let status = status.parse::<ChangeStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(ChangeRequest {
        change_request_id: r.get(0)?,
        project_id: r.get(1)?,
        project_desc: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
        status,
        reason_code: r.get(4)?,
        comment_code: r.get(5)?,
        impact: ImpactTotals {
            annualized: dec(r.get(6)?, "change_requests.annual_impact"),
            year1: dec(r.get(7)?, "change_requests.year1_impact"),
            year2: dec(r.get(8)?, "change_requests.year2_impact"),
        },
        created_on: r.get(9)?,
        approved_on: r.get(10)?,
        fields: Vec::new(),
    })
}

fn load_fields(conn: &Connection, ids: &[i64]) -> Result<HashMap<i64, Vec<FieldChange>>> {
    let mut out: HashMap<i64, Vec<FieldChange>> = HashMap::new();
    let mut stmt = conn.prepare_cached(
        "SELECT field_name, original_value, requested_value, annual_impact, year1_impact, year2_impact,
                reason_code, comment_code
         FROM change_request_fields WHERE change_request_id=?1 ORDER BY id",
    )?;
    for id in ids {
        let rows = stmt.query_map(params![id], |r| {
            Ok(FieldChange {
                field_name: r.get(0)?,
                original_value: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                requested_value: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
                annual_impact: dec(r.get(3)?, "change_request_fields.annual_impact"),
                year1_impact: dec(r.get(4)?, "change_request_fields.year1_impact"),
                year2_impact: dec(r.get(5)?, "change_request_fields.year2_impact"),
                reason_code: r.get(6)?,
                comment_code: r.get(7)?,
            })
        })?;
        let entry = out.entry(*id).or_default();
        for row in rows {
            entry.push(row?);
        }
    }
    Ok(out)
}

/// All requests for a project with their field rows, newest first.
pub fn list(conn: &Connection, project_id: &str) -> Result<Vec<ChangeRequest>> {
    if project_id.trim().is_empty() {
        return Err(AppError::validation("projectId is required"));
    }
    let mut stmt = conn.prepare(&format!(
        "{} WHERE project_id=?1 ORDER BY created_on DESC, id DESC",
        SELECT_PARENT
    ))?;
    let mut requests = stmt
        .query_map(params![project_id.trim()], row_to_request)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let ids: Vec<i64> = requests.iter().map(|r| r.change_request_id).collect();
    let mut fields = load_fields(conn, &ids)?;
    for req in &mut requests {
        req.fields = fields.remove(&req.change_request_id).unwrap_or_default();
    }
    Ok(requests)
}

pub fn get(conn: &Connection, id: i64) -> Result<ChangeRequest> {
    let mut req = conn
        .query_row(
            &format!("{} WHERE id=?1", SELECT_PARENT),
            params![id],
            row_to_request,
        )
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("change request {}", id)))?;
    req.fields = load_fields(conn, &[id])?.remove(&id).unwrap_or_default();
    Ok(req)
}

fn transition(conn: &Connection, id: i64, to: ChangeStatus, actor: &str) -> Result<ChangeRequest> {
    let current = get(conn, id)?;
    if current.status != ChangeStatus::Submitted {
        return Err(AppError::InvalidTransition {
            id,
            from: current.status.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }
    let approved_on = (to == ChangeStatus::Approved).then(now_stamp);
    conn.execute(
        "UPDATE change_requests SET status=?1, approved_on=?2, updated_by=?3
         WHERE id=?4 AND status=?5",
        params![
            to.as_str(),
            approved_on,
            actor,
            id,
            ChangeStatus::Submitted.as_str()
        ],
    )?;
    log::info!("Change request {} moved to {}", id, to.as_str());
    get(conn, id)
}

pub fn approve(conn: &Connection, id: i64, actor: &str) -> Result<ChangeRequest> {
    transition(conn, id, ChangeStatus::Approved, actor)
}

/// Impact figures stay on the record.
pub fn reject(conn: &Connection, id: i64, actor: &str) -> Result<ChangeRequest> {
    transition(conn, id, ChangeStatus::Rejected, actor)
}

/// Impact summed across requests.
pub fn summarize(requests: &[ChangeRequest]) -> ImpactTotals {
    requests.iter().fold(ImpactTotals::default(), |acc, r| ImpactTotals {
        annualized: acc.annualized + r.impact.annualized,
        year1: acc.year1 + r.impact.year1,
        year2: acc.year2 + r.impact.year2,
    })
}
