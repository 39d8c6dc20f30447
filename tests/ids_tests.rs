// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use savingsdesk::app::App;
use savingsdesk::ids::{
    PROJECT_NUMBER_START, is_object_id, new_object_id, next_project_id, next_project_number,
    next_sequence, project_id_exists, project_id_prefix,
};
use savingsdesk::projects::{self, NewProject};
use serde_json::{Map, Value, json};

fn app() -> App {
    App::from_connection(Connection::open_in_memory().unwrap()).unwrap()
}

fn create(app: &mut App, project_id: &str) {
    let mut metadata = Map::new();
    metadata.insert("projectId".into(), Value::String(project_id.into()));
    let new = NewProject {
        metadata,
        ..NewProject::default()
    };
    projects::create(&mut app.conn, "admin", new).unwrap();
}

#[test]
fn sequences_start_at_seed_and_increment() {
    let app = app();
    assert_eq!(next_sequence(&app.conn, "demo", 10).unwrap(), 10);
    assert_eq!(next_sequence(&app.conn, "demo", 10).unwrap(), 11);
    assert_eq!(next_sequence(&app.conn, "other", 1).unwrap(), 1);
    assert_eq!(next_project_number(&app.conn).unwrap(), PROJECT_NUMBER_START);
    assert_eq!(next_project_number(&app.conn).unwrap(), PROJECT_NUMBER_START + 1);
}

#[test]
fn object_ids_are_unique_hex() {
    let app = app();
    let a = new_object_id(&app.conn).unwrap();
    let b = new_object_id(&app.conn).unwrap();
    assert!(is_object_id(&a));
    assert!(is_object_id(&b));
    assert_ne!(a, b);
    assert!(!is_object_id("temp-1"));
    assert!(!is_object_id("57710d0d998edcc80b00002"));
}

#[test]
fn prefix_uses_group_letters_and_year_month() {
    let on = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    assert_eq!(project_id_prefix("assembly", on), "AS2503");
    assert_eq!(project_id_prefix(" Packaging ", on), "PA2503");
}

#[test]
fn next_project_id_continues_the_highest_suffix() {
    let mut app = app();
    assert_eq!(next_project_id(&app.conn, "AS2503").unwrap(), "AS2503001");
    create(&mut app, "AS2503001");
    create(&mut app, "AS2503007");
    create(&mut app, "PA2503042");
    assert_eq!(next_project_id(&app.conn, "AS2503").unwrap(), "AS2503008");
    assert_eq!(next_project_id(&app.conn, "PA2503").unwrap(), "PA2503043");
}

#[test]
fn existence_covers_legacy_projects() {
    let mut app = app();
    create(&mut app, "AS2503001");
    let legacy = json!({"ProjectID": "OLD-17", "Project_Description": "Legacy"});
    projects::insert_legacy(&app.conn, legacy.as_object().unwrap()).unwrap();

    assert!(project_id_exists(&app.conn, "AS2503001").unwrap());
    assert!(project_id_exists(&app.conn, " OLD-17 ").unwrap());
    assert!(!project_id_exists(&app.conn, "AS2503002").unwrap());
}
