// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Folds legacy and current project documents into one canonical shape.

use crate::finance::ProjectWindow;
use crate::models::{FixedCostEntry, FixedCostMode, PlatformRow, YearMonth};
use crate::projects::{CanonicalProject, CurrentProject, LegacyProject, Origin, Project};
use crate::utils::parse_start_date;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Legacy risk codes and the project-status lookup ids they stand for.
const RISK_MAP: [(&str, &str); 3] = [
    ("A", "57710d0d998edcc80b00002d"),
    ("B", "57710d0d998edcc80b00002e"),
    ("C", "57710d0d998edcc80b00002f"),
];

/// Legacy key and the metadata key it is copied to.
const LEGACY_FIELDS: [(&str, &str); 17] = [
    ("ProjectID", "projectId"),
    ("projectNumber", "projectNumber"),
    ("Project_Description", "description"),
    ("Start_Date", "startDate"),
    ("functionGroup", "functionGroup"),
    ("PlantID", "location"),
    ("plantProductLine", "productLine"),
    ("projectOwner", "projectOwner"),
    ("purchasingAgent", "purchasingAgent"),
    ("Status", "status"),
    ("actType", "activityType"),
    ("sheetType", "operationsGroup"),
    ("costType", "costType"),
    ("SubCommodity", "subCommodity"),
    ("supplierVal", "supplier"),
    ("IDCO", "idco"),
    ("Estimated_Annualized_Savings", "Estimated_Annualized_Savings"),
];

pub fn normalize(project: Project) -> CanonicalProject {
    match project {
        Project::Current(p) => normalize_current(p),
        Project::Legacy(p) => normalize_legacy(p),
    }
}

fn normalize_current(p: CurrentProject) -> CanonicalProject {
    let start_date = p
        .metadata
        .get("startDate")
        .and_then(Value::as_str)
        .and_then(parse_start_date);
    CanonicalProject {
        id: p.id,
        project_id: p.project_id,
        origin: Origin::Current,
        start_date,
        metadata: p.metadata,
        platforms: p.platforms,
        fixed_cost: p.fixed_cost,
        fixed_cost_mode: p.fixed_cost_mode,
    }
}

/// Decimal out of a JSON number or numeric string; anything else is zero.
pub(crate) fn decimal_of(v: Option<&Value>) -> Decimal {
    match v {
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn normalize_legacy(p: LegacyProject) -> CanonicalProject {
    let data = &p.data;
    let mut metadata = Map::new();
    for (from, to) in LEGACY_FIELDS {
        let value = data.get(from).cloned().unwrap_or(Value::Null);
        metadata.insert(to.to_string(), value);
    }

    let risk = data
        .get("riskStatus")
        .and_then(Value::as_str)
        .and_then(|code| RISK_MAP.iter().find(|(c, _)| *c == code.trim()))
        .map(|(_, id)| Value::String(id.to_string()))
        .unwrap_or(Value::Null);
    metadata.insert("risk".into(), risk);

    let in_plan = data.get("InPlan").and_then(Value::as_str) == Some("Y");
    metadata.insert(
        "inPlan".into(),
        Value::String(if in_plan { "Yes" } else { "No" }.into()),
    );

    let start_date = data
        .get("Start_Date")
        .and_then(Value::as_str)
        .and_then(parse_start_date);

    let total_volume = decimal_of(
        data.get("TotalVolumeForDisplay")
            .and_then(Value::as_array)
            .and_then(|a| a.first()),
    );
    let annualized = decimal_of(data.get("Estimated_Annualized_Savings"));
    let platforms = data
        .get("platforms")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .enumerate()
                .map(|(idx, lp)| PlatformRow {
                    id: format!("legacy-{}", idx),
                    platform_ref_id: None,
                    platform_name: lp.get("name").and_then(Value::as_str).map(str::to_string),
                    unit_cost: decimal_of(lp.get("cost")),
                    total_volume,
                    annualized_savings: annualized,
                })
                .collect()
        })
        .unwrap_or_default();

    let window = start_date.and_then(ProjectWindow::new);
    let fixed_cost = data
        .get("Repallmothval")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|m| {
                    let month = m
                        .get("dateval")
                        .and_then(Value::as_str)
                        .and_then(YearMonth::parse_loose)?;
                    Some(FixedCostEntry {
                        month,
                        savings: decimal_of(m.get("savings")),
                    })
                })
                .filter(|e| window.as_ref().is_some_and(|w| w.contains(e.month)))
                .collect()
        })
        .unwrap_or_default();

    let project_id = data
        .get("ProjectID")
        .map(crate::diff::coerce)
        .unwrap_or_default();

    CanonicalProject {
        id: p.id,
        project_id,
        origin: Origin::Legacy,
        start_date,
        metadata,
        platforms,
        fixed_cost,
        fixed_cost_mode: FixedCostMode::Manual,
    }
}
