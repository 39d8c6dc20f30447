// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Field-level diff between a baseline project snapshot and an edited draft.

use crate::config::PlatformDiffMode;
use crate::error::Result;
use crate::labels::LABEL_SUFFIX;
use crate::models::{ChangeRecord, PlatformRow, Section, Snapshot};
use rust_decimal::Decimal;
use serde_json::Value;

pub const FIELD_PLATFORM: &str = "Platform";
pub const FIELD_UNIT_COST: &str = "Unit Cost Savings";

/// Structural, audit and derived keys never reported as metadata changes.
const IGNORED_METADATA: &[&str] = &[
    "_lookupCache",
    "financial",
    "documents",
    "documentsDraft",
    "projectNumber",
    "createdOn",
    "createdBy",
    "modifiedOn",
    "modifiedBy",
    "supplierName",
    "Estimated_Annualized_Savings",
    "Weighted_Unit_Cost_Savings",
    "annualized",
    "weightedUnitCost",
    "yearly",
];

/// Maps a raw metadata value to its display form.
pub trait ValueResolver {
    fn resolve(&self, field: &str, value: &Value) -> String;
}

impl<F> ValueResolver for F
where
    F: Fn(&str, &Value) -> String,
{
    fn resolve(&self, field: &str, value: &Value) -> String {
        self(field, value)
    }
}

/// Resolver that leaves every value raw.
pub struct RawValues;

impl ValueResolver for RawValues {
    fn resolve(&self, _field: &str, value: &Value) -> String {
        coerce(value)
    }
}

/// Loose string form used for metadata comparison: null and `""` agree,
/// as do `0` and `"0"`, and `5.0` prints as `5`.
pub fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                        format!("{}", f as i64)
                    }
                    _ => n.to_string(),
                }
            }
        }
        other => other.to_string(),
    }
}

fn decimal_text(d: Decimal) -> String {
    d.normalize().to_string()
}

/// How a `platform_ref_id` change on one block is rendered.
pub trait PlatformChangeStrategy {
    fn describe(
        &self,
        baseline: &[PlatformRow],
        current: &[PlatformRow],
        old_block: &PlatformRow,
        new_block: &PlatformRow,
    ) -> Result<(String, String)>;
}

/// The whole platform list before and after.
pub struct WholeList;

impl PlatformChangeStrategy for WholeList {
    fn describe(
        &self,
        baseline: &[PlatformRow],
        current: &[PlatformRow],
        _old_block: &PlatformRow,
        _new_block: &PlatformRow,
    ) -> Result<(String, String)> {
        Ok((
            serde_json::to_string_pretty(baseline)?,
            serde_json::to_string_pretty(current)?,
        ))
    }
}

/// Only the changed block.
pub struct SingleBlock;

impl PlatformChangeStrategy for SingleBlock {
    fn describe(
        &self,
        _baseline: &[PlatformRow],
        _current: &[PlatformRow],
        old_block: &PlatformRow,
        new_block: &PlatformRow,
    ) -> Result<(String, String)> {
        Ok((
            serde_json::to_string_pretty(old_block)?,
            serde_json::to_string_pretty(new_block)?,
        ))
    }
}

pub fn strategy_for(mode: PlatformDiffMode) -> Box<dyn PlatformChangeStrategy> {
    match mode {
        PlatformDiffMode::WholeList => Box::new(WholeList),
        PlatformDiffMode::SingleBlock => Box::new(SingleBlock),
    }
}

fn is_ignored(key: &str) -> bool {
    IGNORED_METADATA.contains(&key) || key.ends_with(LABEL_SUFFIX)
}

fn ref_of(row: &PlatformRow) -> Option<&str> {
    row.platform_ref_id.as_deref().filter(|s| !s.is_empty())
}

/// Changes from `baseline` to `current` with whole-list platform rendering.
pub fn compute_changes(
    baseline: &Snapshot,
    current: &Snapshot,
    resolver: &dyn ValueResolver,
) -> Result<Vec<ChangeRecord>> {
    compute_changes_with(baseline, current, resolver, &WholeList)
}

/// Ordered by `current`: metadata keys, then matched platform blocks, then
/// matched fixed-cost months. New blocks and months are not reported.
pub fn compute_changes_with(
    baseline: &Snapshot,
    current: &Snapshot,
    resolver: &dyn ValueResolver,
    strategy: &dyn PlatformChangeStrategy,
) -> Result<Vec<ChangeRecord>> {
    let mut changes = Vec::new();

    for (key, new_val) in &current.metadata {
        if is_ignored(key) {
            continue;
        }
        let old_val = baseline.metadata.get(key).unwrap_or(&Value::Null);
        if coerce(old_val) == coerce(new_val) {
            continue;
        }
        changes.push(ChangeRecord {
            section: Section::Metadata,
            field: key.clone(),
            old_value: resolver.resolve(key, old_val),
            new_value: resolver.resolve(key, new_val),
        });
    }

    let old_platforms = &baseline.financial.platforms;
    let new_platforms = &current.financial.platforms;
    for p in new_platforms {
        let Some(old) = old_platforms.iter().find(|o| o.id == p.id) else {
            continue;
        };
        if ref_of(old) != ref_of(p) {
            let (old_value, new_value) = strategy.describe(old_platforms, new_platforms, old, p)?;
            changes.push(ChangeRecord {
                section: Section::Financial,
                field: FIELD_PLATFORM.to_string(),
                old_value,
                new_value,
            });
        }
        if old.unit_cost != p.unit_cost {
            changes.push(ChangeRecord {
                section: Section::Financial,
                field: FIELD_UNIT_COST.to_string(),
                old_value: decimal_text(old.unit_cost),
                new_value: decimal_text(p.unit_cost),
            });
        }
    }

    for f in &current.financial.fixed_cost {
        let Some(old) = baseline
            .financial
            .fixed_cost
            .iter()
            .find(|o| o.month == f.month)
        else {
            continue;
        };
        if old.savings != f.savings {
            changes.push(ChangeRecord {
                section: Section::Financial,
                field: format!("Fixed Cost ({})", f.month.label()),
                old_value: decimal_text(old.savings),
                new_value: decimal_text(f.savings),
            });
        }
    }

    Ok(changes)
}
