// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use savingsdesk::diff::{
    FIELD_PLATFORM, FIELD_UNIT_COST, RawValues, SingleBlock, coerce, compute_changes,
    compute_changes_with,
};
use savingsdesk::models::{
    FinancialSnapshot, FixedCostEntry, PlatformRow, Section, Snapshot, YearMonth,
};
use serde_json::{Value, json};

fn block(id: &str, platform: Option<&str>, cost: i64) -> PlatformRow {
    PlatformRow {
        id: id.into(),
        platform_ref_id: platform.map(str::to_string),
        platform_name: None,
        unit_cost: Decimal::from(cost),
        total_volume: Decimal::from(100),
        annualized_savings: Decimal::ZERO,
    }
}

fn baseline() -> Snapshot {
    let metadata = json!({
        "projectId": "AS2503001",
        "description": "Pallet consolidation",
        "risk": "risk-a",
        "quantity": 0,
        "notes": null,
        "modifiedOn": "2025-03-01T00:00:00.000Z",
    });
    Snapshot {
        metadata: metadata.as_object().unwrap().clone(),
        financial: FinancialSnapshot {
            platforms: vec![block("b1", Some("P1"), 5), block("b2", Some("P2"), 3)],
            fixed_cost: vec![FixedCostEntry {
                month: YearMonth::new(2025, 3).unwrap(),
                savings: Decimal::from(100),
            }],
        },
    }
}

#[test]
fn identical_snapshots_have_no_changes() {
    let b = baseline();
    assert!(compute_changes(&b, &b.clone(), &RawValues).unwrap().is_empty());
}

#[test]
fn metadata_change_is_resolved_to_labels() {
    let b = baseline();
    let mut c = b.clone();
    c.metadata.insert("risk".into(), json!("risk-b"));

    let resolver = |field: &str, value: &Value| match (field, coerce(value).as_str()) {
        ("risk", "risk-a") => "On Track".to_string(),
        ("risk", "risk-b") => "At Risk".to_string(),
        (_, raw) => raw.to_string(),
    };
    let changes = compute_changes(&b, &c, &resolver).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].section, Section::Metadata);
    assert_eq!(changes[0].field, "risk");
    assert_eq!(changes[0].old_value, "On Track");
    assert_eq!(changes[0].new_value, "At Risk");
}

#[test]
fn type_drift_is_not_a_change() {
    let b = baseline();
    let mut c = b.clone();
    c.metadata.insert("quantity".into(), json!("0"));
    c.metadata.insert("notes".into(), json!(""));
    assert!(compute_changes(&b, &c, &RawValues).unwrap().is_empty());
}

#[test]
fn audit_and_label_keys_are_ignored() {
    let b = baseline();
    let mut c = b.clone();
    c.metadata.insert("modifiedOn".into(), json!("2025-04-01T00:00:00.000Z"));
    c.metadata.insert("risk__label".into(), json!("At Risk"));
    c.metadata.insert("Estimated_Annualized_Savings".into(), json!("999"));
    assert!(compute_changes(&b, &c, &RawValues).unwrap().is_empty());
}

#[test]
fn new_metadata_key_is_reported_against_empty() {
    let b = baseline();
    let mut c = b.clone();
    c.metadata.insert("brand".into(), json!("ACME"));
    let changes = compute_changes(&b, &c, &RawValues).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].old_value, "");
    assert_eq!(changes[0].new_value, "ACME");
}

#[test]
fn unit_cost_change_only_reports_unit_cost() {
    let b = baseline();
    let mut c = b.clone();
    c.financial.platforms[0].unit_cost = Decimal::from(7);
    let changes = compute_changes(&b, &c, &RawValues).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].section, Section::Financial);
    assert_eq!(changes[0].field, FIELD_UNIT_COST);
    assert_eq!(changes[0].old_value, "5");
    assert_eq!(changes[0].new_value, "7");
}

#[test]
fn platform_change_renders_whole_list_by_default() {
    let b = baseline();
    let mut c = b.clone();
    c.financial.platforms[1].platform_ref_id = Some("P7".into());
    let changes = compute_changes(&b, &c, &RawValues).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field, FIELD_PLATFORM);
    let old: Vec<PlatformRow> = serde_json::from_str(&changes[0].old_value).unwrap();
    let new: Vec<PlatformRow> = serde_json::from_str(&changes[0].new_value).unwrap();
    assert_eq!(old, b.financial.platforms);
    assert_eq!(new, c.financial.platforms);
}

#[test]
fn platform_change_single_block_strategy() {
    let b = baseline();
    let mut c = b.clone();
    c.financial.platforms[1].platform_ref_id = None;
    let changes = compute_changes_with(&b, &c, &RawValues, &SingleBlock).unwrap();
    assert_eq!(changes.len(), 1);
    let old: PlatformRow = serde_json::from_str(&changes[0].old_value).unwrap();
    let new: PlatformRow = serde_json::from_str(&changes[0].new_value).unwrap();
    assert_eq!(old.id, "b2");
    assert_eq!(old.platform_ref_id.as_deref(), Some("P2"));
    assert_eq!(new.platform_ref_id, None);
}

#[test]
fn fixed_cost_change_is_labelled_by_month() {
    let b = baseline();
    let mut c = b.clone();
    c.financial.fixed_cost[0].savings = Decimal::new(1255, 1);
    let changes = compute_changes(&b, &c, &RawValues).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field, "Fixed Cost (Mar 2025)");
    assert_eq!(changes[0].old_value, "100");
    assert_eq!(changes[0].new_value, "125.5");
}

#[test]
fn added_blocks_and_months_are_not_reported() {
    let b = baseline();
    let mut c = b.clone();
    c.financial.platforms.push(block("temp-1", Some("P3"), 9));
    c.financial.fixed_cost.push(FixedCostEntry {
        month: YearMonth::new(2025, 4).unwrap(),
        savings: Decimal::from(50),
    });
    assert!(compute_changes(&b, &c, &RawValues).unwrap().is_empty());
}

#[test]
fn changes_follow_metadata_then_platforms_then_fixed_cost() {
    let b = baseline();
    let mut c = b.clone();
    c.financial.fixed_cost[0].savings = Decimal::from(1);
    c.financial.platforms[0].unit_cost = Decimal::from(6);
    c.metadata.insert("description".into(), json!("Pallet reuse"));
    let sections: Vec<String> = compute_changes(&b, &c, &RawValues)
        .unwrap()
        .into_iter()
        .map(|c| c.field)
        .collect();
    assert_eq!(
        sections,
        vec!["description", FIELD_UNIT_COST, "Fixed Cost (Mar 2025)"]
    );
}

#[test]
fn metadata_changes_keep_current_key_order() {
    let b = Snapshot {
        metadata: json!({"zeta": "1", "alpha": "1", "mid": "1"})
            .as_object()
            .unwrap()
            .clone(),
        financial: FinancialSnapshot::default(),
    };
    let c = Snapshot {
        metadata: json!({"zeta": "2", "mid": "2", "alpha": "2"})
            .as_object()
            .unwrap()
            .clone(),
        financial: FinancialSnapshot::default(),
    };
    let fields: Vec<String> = compute_changes(&b, &c, &RawValues)
        .unwrap()
        .into_iter()
        .map(|c| c.field)
        .collect();
    assert_eq!(fields, vec!["zeta", "mid", "alpha"]);
}

#[test]
fn coerce_renders_whole_floats_as_integers() {
    assert_eq!(coerce(&json!(null)), "");
    assert_eq!(coerce(&json!(3.0)), "3");
    assert_eq!(coerce(&json!(2.5)), "2.5");
    assert_eq!(coerce(&json!(true)), "true");
    assert_eq!(coerce(&json!("x")), "x");
}
