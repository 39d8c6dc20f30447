// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::utils::{parse_start_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

/// (issue, detail) pairs for everything that looks inconsistent.
pub fn find_issues(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    // 1) Change requests whose field rows never landed
    let mut stmt = conn.prepare(
        "SELECT id, project_id FROM change_requests cr
         WHERE NOT EXISTS (SELECT 1 FROM change_request_fields f WHERE f.change_request_id=cr.id)
         ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let pid: String = r.get(1)?;
        issues.push(("orphan_change_request".into(), format!("#{} {}", id, pid)));
    }

    // 2) Projects without a usable start date
    let mut stmt = conn.prepare(
        "SELECT project_id, json_extract(metadata, '$.startDate') FROM projects ORDER BY project_id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let pid: String = r.get(0)?;
        let start: Option<String> = r.get(1)?;
        if start.as_deref().and_then(parse_start_date).is_none() {
            issues.push(("missing_start_date".into(), pid));
        }
    }

    // 3) Platform blocks pointing at unknown platforms
    let mut stmt = conn.prepare(
        "SELECT p.project_id, pp.platform_ref_id FROM project_platforms pp
         JOIN projects p ON p.id=pp.project_ref
         WHERE pp.platform_ref_id IS NOT NULL
           AND pp.platform_ref_id NOT IN (SELECT id FROM platforms)
         ORDER BY p.project_id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let pid: String = r.get(0)?;
        let platform: String = r.get(1)?;
        issues.push(("unknown_platform".into(), format!("{} {}", pid, platform)));
    }

    Ok(issues)
}

pub fn handle(app: &App) -> Result<()> {
    let rows: Vec<Vec<String>> = find_issues(&app.conn)?
        .into_iter()
        .map(|(issue, detail)| vec![issue, detail])
        .collect();

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
