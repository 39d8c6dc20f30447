// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Project persistence: current and legacy records, creation and listing.

use crate::documents::{self, DocumentUpload};
use crate::error::{AppError, Result};
use crate::feeds::MonthlyUnitFeed;
use crate::finance::FinancialAggregate;
use crate::ids::{is_object_id, new_object_id, next_project_number, project_id_exists};
use crate::models::{FinancialSnapshot, FixedCostEntry, FixedCostMode, PlatformRow, Snapshot, YearMonth};
use crate::normalize::{decimal_of, normalize};
use crate::utils::{now_stamp, stored_decimal};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Origin {
    Current,
    Legacy,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Current => "NEW",
            Origin::Legacy => "LEGACY",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentProject {
    pub id: String,
    pub project_id: String,
    pub project_number: Option<i64>,
    pub metadata: Map<String, Value>,
    pub platforms: Vec<PlatformRow>,
    pub fixed_cost: Vec<FixedCostEntry>,
    pub fixed_cost_mode: FixedCostMode,
}

/// A project document in the pre-migration layout, kept as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyProject {
    pub id: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Project {
    Current(CurrentProject),
    Legacy(LegacyProject),
}

/// The one shape the financial and diff code works with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalProject {
    pub id: String,
    pub project_id: String,
    pub origin: Origin,
    pub start_date: Option<NaiveDate>,
    pub metadata: Map<String, Value>,
    pub platforms: Vec<PlatformRow>,
    pub fixed_cost: Vec<FixedCostEntry>,
    pub fixed_cost_mode: FixedCostMode,
}

impl CanonicalProject {
    pub fn description(&self) -> String {
        self.metadata
            .get("description")
            .map(crate::diff::coerce)
            .unwrap_or_default()
    }

    pub fn aggregate(&self, feed: &dyn MonthlyUnitFeed) -> FinancialAggregate {
        FinancialAggregate::hydrate(
            self.start_date,
            &self.platforms,
            &self.fixed_cost,
            self.fixed_cost_mode,
            feed,
        )
    }

    pub fn snapshot(&self, aggregate: &FinancialAggregate) -> Snapshot {
        Snapshot {
            metadata: self.metadata.clone(),
            financial: aggregate.snapshot(),
        }
    }
}

/// Input for [`create`].
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub metadata: Map<String, Value>,
    pub financial: FinancialSnapshot,
    pub fixed_cost_mode: Option<FixedCostMode>,
    pub documents: Vec<DocumentUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedProject {
    pub id: String,
    pub project_id: String,
    pub project_number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub project_id: String,
    pub description: String,
    pub start_date: Option<String>,
    pub estimated_annualized_savings: Decimal,
    pub source: Origin,
    pub created_on: String,
}

fn load_platforms(conn: &Connection, project_ref: &str) -> Result<Vec<PlatformRow>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, platform_ref_id, platform_name, unit_cost, total_volume, annualized_savings
         FROM project_platforms WHERE project_ref=?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![project_ref], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, platform_ref_id, platform_name, uc, tv, an) = row?;
        out.push(PlatformRow {
            id,
            platform_ref_id,
            platform_name,
            unit_cost: stored_decimal(&uc, "project_platforms.unit_cost"),
            total_volume: stored_decimal(&tv, "project_platforms.total_volume"),
            annualized_savings: stored_decimal(&an, "project_platforms.annualized_savings"),
        });
    }
    Ok(out)
}

fn load_fixed_cost(conn: &Connection, project_ref: &str) -> Result<Vec<FixedCostEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT month, savings FROM project_fixed_cost_savings WHERE project_ref=?1 ORDER BY month",
    )?;
    let rows = stmt.query_map(params![project_ref], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (m, s) = row?;
        let month = YearMonth::parse_loose(&m)
            .ok_or_else(|| AppError::validation(format!("Invalid stored month '{}'", m)))?;
        out.push(FixedCostEntry {
            month,
            savings: stored_decimal(&s, "project_fixed_cost_savings.savings"),
        });
    }
    Ok(out)
}

/// Current project by internal id or `projectId`, then legacy by id or `ProjectID`.
pub fn load(conn: &Connection, key: &str) -> Result<Project> {
    let key = key.trim();
    let current = conn
        .query_row(
            "SELECT id, project_id, project_number, metadata, fixed_cost_mode
             FROM projects WHERE id=?1 OR project_id=?1 LIMIT 1",
            params![key],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<i64>>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;
    if let Some((id, project_id, project_number, metadata, mode)) = current {
        let metadata: Map<String, Value> = serde_json::from_str(&metadata)?;
        let fixed_cost_mode = mode.parse().unwrap_or(FixedCostMode::Manual);
        return Ok(Project::Current(CurrentProject {
            platforms: load_platforms(conn, &id)?,
            fixed_cost: load_fixed_cost(conn, &id)?,
            id,
            project_id,
            project_number,
            metadata,
            fixed_cost_mode,
        }));
    }

    let legacy = conn
        .query_row(
            "SELECT id, data FROM legacy_projects WHERE id=?1 OR project_id=?1 LIMIT 1",
            params![key],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()?;
    match legacy {
        Some((id, data)) => Ok(Project::Legacy(LegacyProject {
            id,
            data: serde_json::from_str(&data)?,
        })),
        None => Err(AppError::not_found(format!("project '{}'", key))),
    }
}

pub fn load_canonical(conn: &Connection, key: &str) -> Result<CanonicalProject> {
    Ok(normalize(load(conn, key)?))
}

fn insert_platforms(
    conn: &Connection,
    project_ref: &str,
    rows: &[PlatformRow],
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO project_platforms(id, project_ref, platform_ref_id, platform_name, unit_cost, total_volume, annualized_savings)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for row in rows {
        let id = if is_object_id(&row.id) {
            row.id.clone()
        } else {
            new_object_id(conn)?
        };
        stmt.execute(params![
            id,
            project_ref,
            row.platform_ref_id.as_deref().filter(|s| !s.is_empty()),
            row.platform_name,
            row.unit_cost.to_string(),
            row.total_volume.to_string(),
            row.annualized_savings.to_string()
        ])?;
    }
    Ok(())
}

fn insert_fixed_cost(conn: &Connection, project_ref: &str, rows: &[FixedCostEntry]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO project_fixed_cost_savings(project_ref, month, savings) VALUES (?1, ?2, ?3)
         ON CONFLICT(project_ref, month) DO UPDATE SET savings=excluded.savings",
    )?;
    for row in rows {
        stmt.execute(params![project_ref, row.month.to_string(), row.savings.to_string()])?;
    }
    Ok(())
}

/// Create a project with its platforms, fixed-cost rows and documents in
/// one transaction.
pub fn create(conn: &mut Connection, actor: &str, new: NewProject) -> Result<CreatedProject> {
    let project_id = new
        .metadata
        .get("projectId")
        .map(crate::diff::coerce)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if project_id.is_empty() {
        return Err(AppError::validation("projectId is required"));
    }
    if project_id_exists(conn, &project_id)? {
        return Err(AppError::validation(format!(
            "projectId '{}' already exists",
            project_id
        )));
    }

    let tx = conn.transaction()?;
    let id = new_object_id(&tx)?;
    let project_number = next_project_number(&tx)?;
    let now = now_stamp();

    let mut metadata = new.metadata;
    metadata.insert("projectId".into(), Value::String(project_id.clone()));
    metadata.insert("projectNumber".into(), Value::from(project_number));
    metadata.insert("createdBy".into(), Value::String(actor.to_string()));
    metadata.insert("createdOn".into(), Value::String(now.clone()));
    let mode = new.fixed_cost_mode.unwrap_or(FixedCostMode::Manual);

    tx.execute(
        "INSERT INTO projects(id, project_id, project_number, metadata, fixed_cost_mode, created_by, created_on, modified_by, modified_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6, ?7)",
        params![
            id,
            project_id,
            project_number,
            serde_json::to_string(&metadata)?,
            mode.as_str(),
            actor,
            now
        ],
    )?;
    insert_fixed_cost(&tx, &id, &new.financial.fixed_cost)?;
    insert_platforms(&tx, &id, &new.financial.platforms)?;
    for doc in &new.documents {
        documents::attach(&tx, &id, doc, actor)?;
    }
    tx.commit()?;

    log::info!("Created project {} (#{})", project_id, project_number);
    Ok(CreatedProject {
        id,
        project_id,
        project_number,
    })
}

fn require_current(project: &CanonicalProject) -> Result<()> {
    if project.origin == Origin::Legacy {
        return Err(AppError::validation(format!(
            "legacy project '{}' is read-only",
            project.project_id
        )));
    }
    Ok(())
}

/// Replace the stored financial picture with `aggregate` (last write wins).
pub fn save_financial(
    conn: &mut Connection,
    project: &CanonicalProject,
    aggregate: &FinancialAggregate,
    actor: &str,
) -> Result<()> {
    require_current(project)?;
    let snapshot = aggregate.snapshot();
    let totals = aggregate.totals();

    let mut metadata = project.metadata.clone();
    metadata.insert(
        "startDate".into(),
        aggregate
            .start()
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
    );
    metadata.insert(
        "Estimated_Annualized_Savings".into(),
        Value::String(totals.annualized.round_dp(2).to_string()),
    );
    metadata.insert(
        "Weighted_Unit_Cost_Savings".into(),
        Value::String(totals.weighted_unit_cost.round_dp(4).to_string()),
    );

    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM project_platforms WHERE project_ref=?1",
        params![project.id],
    )?;
    tx.execute(
        "DELETE FROM project_fixed_cost_savings WHERE project_ref=?1",
        params![project.id],
    )?;
    insert_platforms(&tx, &project.id, &snapshot.platforms)?;
    insert_fixed_cost(&tx, &project.id, &snapshot.fixed_cost)?;
    touch(&tx, &project.id, &metadata, Some(aggregate.fixed_cost().mode), actor)?;
    tx.commit()?;
    Ok(())
}

fn touch(
    conn: &Connection,
    id: &str,
    metadata: &Map<String, Value>,
    mode: Option<FixedCostMode>,
    actor: &str,
) -> Result<()> {
    let mut metadata = metadata.clone();
    let now = now_stamp();
    metadata.insert("modifiedBy".into(), Value::String(actor.to_string()));
    metadata.insert("modifiedOn".into(), Value::String(now.clone()));
    let n = conn.execute(
        "UPDATE projects SET metadata=?1, fixed_cost_mode=COALESCE(?2, fixed_cost_mode),
         modified_by=?3, modified_on=?4 WHERE id=?5",
        params![
            serde_json::to_string(&metadata)?,
            mode.map(|m| m.as_str()),
            actor,
            now,
            id
        ],
    )?;
    if n == 0 {
        return Err(AppError::not_found(format!("project '{}'", id)));
    }
    Ok(())
}

/// Store a raw legacy document. `ProjectID` is indexed for lookups.
pub fn insert_legacy(conn: &Connection, data: &Map<String, Value>) -> Result<String> {
    let project_id = data
        .get("ProjectID")
        .map(crate::diff::coerce)
        .unwrap_or_default();
    let id = match data.get("_id").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => new_object_id(conn)?,
    };
    conn.execute(
        "INSERT INTO legacy_projects(id, project_id, data, imported_on) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET project_id=excluded.project_id, data=excluded.data",
        params![id, project_id, serde_json::to_string(data)?, now_stamp()],
    )?;
    Ok(id)
}

fn text(metadata: &Map<String, Value>, key: &str) -> String {
    metadata.get(key).map(crate::diff::coerce).unwrap_or_default()
}

/// Legacy and current projects merged by `projectId` (current wins),
/// newest first, capped at [`LIST_LIMIT`].
pub fn list_merged(conn: &Connection) -> Result<Vec<ProjectSummary>> {
    let mut merged: HashMap<String, ProjectSummary> = HashMap::new();

    let mut stmt = conn.prepare(
        "SELECT id, data, imported_on FROM legacy_projects ORDER BY imported_on DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![LIST_LIMIT as i64], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (id, data, imported_on) = row?;
        let data: Map<String, Value> = serde_json::from_str(&data)?;
        let project_id = {
            let p = text(&data, "ProjectID");
            if p.is_empty() { text(&data, "projectId") } else { p }
        };
        if project_id.is_empty() {
            continue;
        }
        let description = {
            let d = text(&data, "Project_Description");
            if d.is_empty() { text(&data, "description") } else { d }
        };
        let start = {
            let s = text(&data, "Start_Date");
            if s.is_empty() { text(&data, "startDate") } else { s }
        };
        merged.insert(
            project_id.clone(),
            ProjectSummary {
                id,
                project_id,
                description,
                start_date: Some(start).filter(|s| !s.is_empty()),
                estimated_annualized_savings: decimal_of(data.get("Estimated_Annualized_Savings")),
                source: Origin::Legacy,
                created_on: imported_on,
            },
        );
    }

    let mut stmt = conn.prepare(
        "SELECT p.id, p.project_id, p.metadata, p.created_on,
                (SELECT COUNT(*) FROM project_platforms pp WHERE pp.project_ref=p.id)
         FROM projects p ORDER BY p.created_on DESC, p.id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![LIST_LIMIT as i64], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, i64>(4)?,
        ))
    })?;
    for row in rows {
        let (id, project_id, metadata, created_on, platform_count) = row?;
        let metadata: Map<String, Value> = serde_json::from_str(&metadata)?;
        let estimated = if platform_count > 0 {
            load_platforms(conn, &id)?
                .iter()
                .map(|p| p.annualized_savings)
                .sum()
        } else {
            decimal_of(metadata.get("Estimated_Annualized_Savings"))
        };
        let start = text(&metadata, "startDate");
        merged.insert(
            project_id.clone(),
            ProjectSummary {
                id,
                project_id,
                description: text(&metadata, "description"),
                start_date: Some(start).filter(|s| !s.is_empty()),
                estimated_annualized_savings: estimated,
                source: Origin::Current,
                created_on,
            },
        );
    }

    let mut out: Vec<ProjectSummary> = merged.into_values().collect();
    out.sort_by(|a, b| {
        b.created_on
            .cmp(&a.created_on)
            .then_with(|| b.id.cmp(&a.id))
    });
    out.truncate(LIST_LIMIT);
    Ok(out)
}
