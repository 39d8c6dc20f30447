// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use savingsdesk::app::App;
use savingsdesk::error::AppError;
use savingsdesk::finance::Totals;
use savingsdesk::models::{ChangeRecord, ChangeStatus, ImpactTotals, Section};
use savingsdesk::workflow::{self, Submission, impact_from_totals};

fn app() -> App {
    App::from_connection(Connection::open_in_memory().unwrap()).unwrap()
}

fn change(field: &str, old: &str, new: &str) -> ChangeRecord {
    ChangeRecord {
        section: Section::Metadata,
        field: field.into(),
        old_value: old.into(),
        new_value: new.into(),
    }
}

fn impact(annualized: i64) -> ImpactTotals {
    ImpactTotals {
        annualized: Decimal::from(annualized),
        year1: Decimal::from(annualized / 2),
        year2: Decimal::from(annualized / 4),
    }
}

fn submit(app: &mut App, project_id: &str, changes: &[ChangeRecord], annualized: i64) -> i64 {
    let sub = Submission {
        project_id,
        project_desc: "Pallet consolidation",
        reason_code: Some("R1"),
        comment_code: None,
        changes,
        totals: impact(annualized),
    };
    workflow::submit(&mut app.conn, "planner", &sub).unwrap()
}

#[test]
fn submit_requires_project_and_changes() {
    let mut app = app();
    let changes = vec![change("risk", "A", "B")];
    let no_project = Submission {
        project_id: "  ",
        project_desc: "",
        reason_code: None,
        comment_code: None,
        changes: &changes,
        totals: ImpactTotals::default(),
    };
    assert!(matches!(
        workflow::submit(&mut app.conn, "planner", &no_project),
        Err(AppError::Validation(_))
    ));

    let no_changes = Submission {
        project_id: "AS2503001",
        changes: &[],
        ..no_project
    };
    assert!(matches!(
        workflow::submit(&mut app.conn, "planner", &no_changes),
        Err(AppError::Validation(_))
    ));

    let count: i64 = app
        .conn
        .query_row("SELECT COUNT(*) FROM change_requests", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn submitted_requests_list_newest_first_with_fields() {
    let mut app = app();
    let first = submit(&mut app, "AS2503001", &[change("risk", "A", "B")], 400);
    let second = submit(
        &mut app,
        "AS2503001",
        &[change("description", "x", "y"), change("brand", "", "ACME")],
        800,
    );
    submit(&mut app, "OTHER001", &[change("risk", "A", "C")], 100);

    let list = workflow::list(&app.conn, "AS2503001").unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].change_request_id, second);
    assert_eq!(list[1].change_request_id, first);
    assert_eq!(list[0].status, ChangeStatus::Submitted);
    assert_eq!(list[0].fields.len(), 2);
    assert_eq!(list[0].fields[0].field_name, "description");
    assert_eq!(list[0].fields[0].annual_impact, Decimal::from(800));
    assert_eq!(list[0].fields[0].reason_code.as_deref(), Some("R1"));

    let totals = workflow::summarize(&list);
    assert_eq!(totals.annualized, Decimal::from(1200));
    assert_eq!(totals.year1, Decimal::from(600));
}

#[test]
fn list_requires_project_id() {
    let app = app();
    assert!(matches!(
        workflow::list(&app.conn, ""),
        Err(AppError::Validation(_))
    ));
    assert!(workflow::list(&app.conn, "NOPE").unwrap().is_empty());
}

#[test]
fn approve_and_reject_only_from_submitted() {
    let mut app = app();
    let a = submit(&mut app, "AS2503001", &[change("risk", "A", "B")], 10);
    let r = submit(&mut app, "AS2503001", &[change("risk", "B", "C")], 10);

    let approved = workflow::approve(&app.conn, a, "lead").unwrap();
    assert_eq!(approved.status, ChangeStatus::Approved);
    assert!(approved.approved_on.is_some());
    assert!(matches!(
        workflow::approve(&app.conn, a, "lead"),
        Err(AppError::InvalidTransition { .. })
    ));
    assert!(matches!(
        workflow::reject(&app.conn, a, "lead"),
        Err(AppError::InvalidTransition { .. })
    ));

    let rejected = workflow::reject(&app.conn, r, "lead").unwrap();
    assert_eq!(rejected.status, ChangeStatus::Rejected);
    assert!(rejected.approved_on.is_none());
    assert_eq!(rejected.impact.annualized, Decimal::from(10));
}

#[test]
fn unknown_request_is_not_found() {
    let app = app();
    assert!(matches!(workflow::get(&app.conn, 42), Err(AppError::NotFound(_))));
    assert!(matches!(
        workflow::approve(&app.conn, 42, "lead"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn failed_child_insert_leaves_no_parent() {
    let mut app = app();
    app.conn
        .execute_batch("DROP TABLE change_request_fields")
        .unwrap();
    let changes = vec![change("risk", "A", "B")];
    let sub = Submission {
        project_id: "AS2503001",
        project_desc: "",
        reason_code: None,
        comment_code: None,
        changes: &changes,
        totals: ImpactTotals::default(),
    };
    assert!(workflow::submit(&mut app.conn, "planner", &sub).is_err());
    let count: i64 = app
        .conn
        .query_row("SELECT COUNT(*) FROM change_requests", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn impact_uses_current_and_next_calendar_year() {
    let mut totals = Totals {
        annualized: Decimal::from(1500),
        ..Totals::default()
    };
    totals.yearly.insert(2025, Decimal::from(1000));
    totals.yearly.insert(2026, Decimal::from(500));
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let impact = impact_from_totals(&totals, today);
    assert_eq!(impact.annualized, Decimal::from(1500));
    assert_eq!(impact.year1, Decimal::from(1000));
    assert_eq!(impact.year2, Decimal::from(500));

    let later = impact_from_totals(&totals, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    assert_eq!(later.year1, Decimal::ZERO);
}
