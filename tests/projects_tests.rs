// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use savingsdesk::app::App;
use savingsdesk::diff::{FIELD_UNIT_COST, RawValues, WholeList};
use savingsdesk::documents::{self, DocumentUpload};
use savingsdesk::error::AppError;
use savingsdesk::feeds::EmptyFeed;
use savingsdesk::finance::{FinancialAggregate, PlatformPatch};
use savingsdesk::ids::{PROJECT_NUMBER_START, is_object_id};
use savingsdesk::models::{FixedCostMode, YearMonth};
use savingsdesk::projects::{self, NewProject, Origin, Project};
use savingsdesk::session::EditSession;
use serde_json::{Map, Value, json};

fn app() -> App {
    App::from_connection(Connection::open_in_memory().unwrap()).unwrap()
}

fn meta(v: Value) -> Map<String, Value> {
    v.as_object().unwrap().clone()
}

fn new_project(project_id: &str, start: &str) -> NewProject {
    NewProject {
        metadata: meta(json!({
            "projectId": project_id,
            "description": "Pallet consolidation",
            "startDate": start,
            "risk": "risk-a",
        })),
        ..NewProject::default()
    }
}

fn legacy_doc() -> Map<String, Value> {
    meta(json!({
        "_id": "5a1f00000000000000000001",
        "ProjectID": "LG-001",
        "Project_Description": "Old pallets",
        "Start_Date": "2025-01-01T00:00:00.000Z",
        "riskStatus": "B",
        "InPlan": "Y",
        "platforms": [{"name": "Rail", "cost": 2}],
        "TotalVolumeForDisplay": [1200],
        "Estimated_Annualized_Savings": 2400,
        "Repallmothval": [
            {"dateval": "2025-02-01T00:00:00.000Z", "savings": 100},
            {"dateval": "2027-02-01T00:00:00.000Z", "savings": 900}
        ]
    }))
}

#[test]
fn create_stamps_number_and_audit() {
    let mut app = app();
    let created = projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01"))
        .unwrap();
    assert_eq!(created.project_number, PROJECT_NUMBER_START);
    assert!(is_object_id(&created.id));

    let Project::Current(p) = projects::load(&app.conn, "AS2503001").unwrap() else {
        panic!("expected a current project");
    };
    assert_eq!(p.id, created.id);
    assert_eq!(p.project_number, Some(PROJECT_NUMBER_START));
    assert_eq!(p.metadata["createdBy"], json!("planner"));
    assert_eq!(p.metadata["projectNumber"], json!(PROJECT_NUMBER_START));

    // by internal id as well
    assert!(projects::load(&app.conn, &created.id).is_ok());
}

#[test]
fn stored_metadata_keeps_key_order() {
    let mut app = app();
    projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    let Project::Current(p) = projects::load(&app.conn, "AS2503001").unwrap() else {
        panic!("expected a current project");
    };
    let keys: Vec<&str> = p.metadata.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "projectId",
            "description",
            "startDate",
            "risk",
            "projectNumber",
            "createdBy",
            "createdOn"
        ]
    );
}

#[test]
fn create_rejects_missing_or_duplicate_ids() {
    let mut app = app();
    let missing = NewProject::default();
    assert!(matches!(
        projects::create(&mut app.conn, "planner", missing),
        Err(AppError::Validation(_))
    ));

    projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    assert!(matches!(
        projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")),
        Err(AppError::Validation(_))
    ));

    projects::insert_legacy(&app.conn, &legacy_doc()).unwrap();
    assert!(matches!(
        projects::create(&mut app.conn, "planner", new_project("LG-001", "2025-01-01")),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn create_is_atomic_with_documents() {
    let mut app = app();
    let mut new = new_project("AS2503001", "2025-01-01");
    new.documents = vec![DocumentUpload {
        doc_type: "quote".into(),
        file_name: " ".into(),
        content: b"x".to_vec(),
    }];
    assert!(projects::create(&mut app.conn, "planner", new).is_err());
    assert!(matches!(
        projects::load(&app.conn, "AS2503001"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn unknown_project_is_not_found() {
    let app = app();
    assert!(matches!(
        projects::load(&app.conn, "missing"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn legacy_projects_normalize_to_canonical_shape() {
    let app = app();
    projects::insert_legacy(&app.conn, &legacy_doc()).unwrap();
    let p = projects::load_canonical(&app.conn, "LG-001").unwrap();

    assert_eq!(p.origin, Origin::Legacy);
    assert_eq!(p.project_id, "LG-001");
    assert_eq!(p.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
    assert_eq!(p.description(), "Old pallets");
    assert_eq!(p.metadata["risk"], json!("57710d0d998edcc80b00002e"));
    assert_eq!(p.metadata["inPlan"], json!("Yes"));

    assert_eq!(p.platforms.len(), 1);
    assert_eq!(p.platforms[0].id, "legacy-0");
    assert_eq!(p.platforms[0].platform_name.as_deref(), Some("Rail"));
    assert_eq!(p.platforms[0].unit_cost, Decimal::from(2));
    assert_eq!(p.platforms[0].total_volume, Decimal::from(1200));

    // months outside the window are dropped
    assert_eq!(p.fixed_cost.len(), 1);
    assert_eq!(p.fixed_cost[0].month, YearMonth::new(2025, 2).unwrap());

    let agg = p.aggregate(&EmptyFeed);
    assert_eq!(agg.totals().annualized, Decimal::from(2500));
}

#[test]
fn legacy_projects_are_read_only() {
    let mut app = app();
    projects::insert_legacy(&app.conn, &legacy_doc()).unwrap();
    let p = projects::load_canonical(&app.conn, "LG-001").unwrap();
    let agg = p.aggregate(&EmptyFeed);
    assert!(matches!(
        projects::save_financial(&mut app.conn, &p, &agg, "planner"),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn saving_financials_persists_rows_and_totals() {
    let mut app = app();
    projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    let p = projects::load_canonical(&app.conn, "AS2503001").unwrap();

    let mut agg = p.aggregate(&EmptyFeed);
    let block = agg.add_platform_block();
    agg.update_platform_block(
        &block,
        PlatformPatch {
            unit_cost: Some(Decimal::from(3)),
            total_volume_raw: Some(Decimal::from(600)),
            ..PlatformPatch::default()
        },
        &EmptyFeed,
    )
    .unwrap();
    agg.set_fixed_cost_annual_total(Decimal::from(1200)).unwrap();
    projects::save_financial(&mut app.conn, &p, &agg, "planner").unwrap();

    let saved = projects::load_canonical(&app.conn, "AS2503001").unwrap();
    assert_eq!(saved.platforms.len(), 1);
    assert!(is_object_id(&saved.platforms[0].id));
    assert_eq!(saved.platforms[0].unit_cost, Decimal::from(3));
    assert_eq!(saved.fixed_cost.len(), 12);
    assert_eq!(saved.fixed_cost_mode, FixedCostMode::Auto);
    let stored: Decimal = saved.metadata["Estimated_Annualized_Savings"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(stored, Decimal::from(3000));
    assert_eq!(saved.metadata["modifiedBy"], json!("planner"));

    let reloaded = saved.aggregate(&EmptyFeed);
    assert_eq!(reloaded.totals().annualized, Decimal::from(3000));
}

#[test]
fn corrupt_stored_decimals_read_as_zero() {
    let mut app = app();
    projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    let p = projects::load_canonical(&app.conn, "AS2503001").unwrap();
    let mut agg = p.aggregate(&EmptyFeed);
    let block = agg.add_platform_block();
    agg.update_platform_block(
        &block,
        PlatformPatch {
            unit_cost: Some(Decimal::from(3)),
            total_volume_raw: Some(Decimal::from(600)),
            ..PlatformPatch::default()
        },
        &EmptyFeed,
    )
    .unwrap();
    agg.set_fixed_cost_annual_total(Decimal::from(1200)).unwrap();
    projects::save_financial(&mut app.conn, &p, &agg, "planner").unwrap();

    app.conn
        .execute("UPDATE project_platforms SET unit_cost='3,5'", [])
        .unwrap();
    app.conn
        .execute(
            "UPDATE project_fixed_cost_savings SET savings='n/a' WHERE month LIKE '2025-01%'",
            [],
        )
        .unwrap();

    let loaded = projects::load_canonical(&app.conn, "AS2503001").unwrap();
    assert_eq!(loaded.platforms[0].unit_cost, Decimal::ZERO);
    assert_eq!(loaded.platforms[0].total_volume, Decimal::from(600));
    assert_eq!(loaded.fixed_cost[0].savings, Decimal::ZERO);
    assert_eq!(
        loaded.fixed_cost[1].savings,
        agg.fixed_cost().monthly[&YearMonth::new(2025, 2).unwrap()]
    );
}

#[test]
fn merged_list_prefers_current_projects() {
    let mut app = app();
    projects::insert_legacy(&app.conn, &legacy_doc()).unwrap();
    projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    // an older copy of the same project arriving from the legacy store
    let shadow = meta(json!({"ProjectID": "AS2503001", "Project_Description": "Stale"}));
    projects::insert_legacy(&app.conn, &shadow).unwrap();

    let list = projects::list_merged(&app.conn).unwrap();
    assert_eq!(list.len(), 2);
    let current = list.iter().find(|p| p.project_id == "AS2503001").unwrap();
    assert_eq!(current.source, Origin::Current);
    assert_eq!(current.description, "Pallet consolidation");
    let legacy = list.iter().find(|p| p.project_id == "LG-001").unwrap();
    assert_eq!(legacy.source, Origin::Legacy);
    assert_eq!(legacy.estimated_annualized_savings, Decimal::from(2400));
}

#[test]
fn documents_round_trip() {
    let mut app = app();
    let created =
        projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    let upload = DocumentUpload {
        doc_type: "quote".into(),
        file_name: "quote.pdf".into(),
        content: b"%PDF-1.4".to_vec(),
    };
    let meta = documents::attach(&app.conn, &created.id, &upload, "planner").unwrap();
    let listed = documents::list(&app.conn, &created.id).unwrap();
    assert_eq!(listed, vec![meta.clone()]);

    let (fetched, content) = documents::fetch(&app.conn, &meta.id).unwrap();
    assert_eq!(fetched.file_name, "quote.pdf");
    assert_eq!(content, b"%PDF-1.4");
    assert!(matches!(
        documents::fetch(&app.conn, "nope"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn edit_session_reviews_against_baseline() {
    let mut app = app();
    projects::create(&mut app.conn, "planner", new_project("AS2503001", "2025-01-01")).unwrap();
    let p = projects::load_canonical(&app.conn, "AS2503001").unwrap();
    let mut seeded = p.aggregate(&EmptyFeed);
    let block = seeded.add_platform_block();
    seeded
        .update_platform_block(
            &block,
            PlatformPatch {
                unit_cost: Some(Decimal::from(5)),
                total_volume_raw: Some(Decimal::from(120)),
                ..PlatformPatch::default()
            },
            &EmptyFeed,
        )
        .unwrap();
    projects::save_financial(&mut app.conn, &p, &seeded, "planner").unwrap();

    let p = projects::load_canonical(&app.conn, "AS2503001").unwrap();
    let block_id = p.platforms[0].id.clone();
    let mut session = EditSession::open(p, &EmptyFeed);
    assert!(session.review(&RawValues, &WholeList).unwrap().is_empty());

    session
        .update_platform_block(
            &block_id,
            PlatformPatch {
                unit_cost: Some(Decimal::from(7)),
                ..PlatformPatch::default()
            },
        )
        .unwrap();
    session.set_field("risk", json!("risk-b"));

    let changes = session.review(&RawValues, &WholeList).unwrap();
    let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["risk", FIELD_UNIT_COST]);

    let impact = session.impact(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    assert_eq!(impact.annualized, Decimal::from(840));
    assert_eq!(impact.year1, Decimal::from(840));
    assert_eq!(impact.year2, Decimal::ZERO);
    // the baseline never moves
    assert_eq!(session.baseline().financial.platforms[0].unit_cost, Decimal::from(5));
}

#[test]
fn aggregate_without_start_is_empty() {
    let agg = FinancialAggregate::new(None);
    assert!(agg.window().is_none());
    assert_eq!(agg.totals().annualized, Decimal::ZERO);
}
