// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use savingsdesk::app::App;
use savingsdesk::diff::ValueResolver;
use savingsdesk::error::AppError;
use savingsdesk::labels::{LookupResolver, enrich};
use savingsdesk::lookups::{STATUS_ACTIVE, STATUS_INACTIVE};
use savingsdesk::registry::{DeletePolicy, EntityKind};
use savingsdesk::{cli, commands};
use serde_json::{Map, Value, json};

fn app() -> App {
    App::from_connection(Connection::open_in_memory().unwrap()).unwrap()
}

fn doc(v: Value) -> Map<String, Value> {
    v.as_object().unwrap().clone()
}

#[test]
fn kinds_parse_from_collection_names() {
    assert_eq!("brand".parse::<EntityKind>().unwrap(), EntityKind::Brand);
    assert_eq!("Locations".parse::<EntityKind>().unwrap(), EntityKind::Location);
    assert_eq!("usersClean".parse::<EntityKind>().unwrap(), EntityKind::User);
    assert!("widgets".parse::<EntityKind>().is_err());
    assert_eq!(EntityKind::Idco.to_string(), "idco");
}

#[test]
fn create_requires_label_field() {
    let app = app();
    let err = app
        .lookups()
        .create(EntityKind::Brand, doc(json!({"name": "ACME"})))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn create_stamps_status_and_audit_fields() {
    let app = app();
    let lookups = app.lookups();
    let id = lookups
        .create(EntityKind::Brand, doc(json!({"brandName": "ACME"})))
        .unwrap();
    let brand = lookups.get(EntityKind::Brand, &id).unwrap();
    assert_eq!(brand.status, STATUS_ACTIVE);
    assert_eq!(brand.text("brandStatus"), Some(STATUS_ACTIVE));
    assert_eq!(brand.text("brandCreatedBy"), Some("admin"));
    assert!(brand.text("createdOn").is_some());
    assert_eq!(brand.label(), "ACME");
}

#[test]
fn soft_delete_hides_from_active_list() {
    let app = app();
    let lookups = app.lookups();
    let id = lookups
        .create(EntityKind::Brand, doc(json!({"brandName": "ACME"})))
        .unwrap();
    assert_eq!(lookups.remove(EntityKind::Brand, &id).unwrap(), DeletePolicy::Soft);
    assert!(lookups.list(EntityKind::Brand, false).unwrap().is_empty());
    let all = lookups.list(EntityKind::Brand, true).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, STATUS_INACTIVE);
}

#[test]
fn hard_delete_removes_row() {
    let app = app();
    let lookups = app.lookups();
    let id = lookups
        .create(EntityKind::Idco, doc(json!({"idcoTableName": "IDCO-1"})))
        .unwrap();
    assert_eq!(lookups.remove(EntityKind::Idco, &id).unwrap(), DeletePolicy::Hard);
    assert!(lookups.list(EntityKind::Idco, true).unwrap().is_empty());
    assert!(matches!(
        lookups.remove(EntityKind::Idco, &id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn writes_clear_the_cache() {
    let app = app();
    let lookups = app.lookups();
    lookups.list(EntityKind::Brand, false).unwrap();
    assert_eq!(app.lookup_cache().len(), 1);

    lookups
        .create(EntityKind::Brand, doc(json!({"brandName": "ACME"})))
        .unwrap();
    assert!(app.lookup_cache().is_empty());
    assert_eq!(lookups.list(EntityKind::Brand, false).unwrap().len(), 1);
}

#[test]
fn update_merges_fields() {
    let app = app();
    let lookups = app.lookups();
    let id = lookups
        .create(
            EntityKind::Supplier,
            doc(json!({"supplierName": "Steelco", "country": "DE"})),
        )
        .unwrap();
    lookups
        .update(EntityKind::Supplier, &id, doc(json!({"country": "AT"})))
        .unwrap();
    let s = lookups.get(EntityKind::Supplier, &id).unwrap();
    assert_eq!(s.text("supplierName"), Some("Steelco"));
    assert_eq!(s.text("country"), Some("AT"));
    assert!(s.text("modifiedOn").is_some());
}

#[test]
fn enrich_adds_reference_labels() {
    let app = app();
    let lookups = app.lookups();
    let group = lookups
        .create(EntityKind::OpsGroup, doc(json!({"opsGroupName": "Assembly"})))
        .unwrap();
    lookups
        .create(
            EntityKind::OpsMode,
            doc(json!({"opsModeName": "Line", "opsGroupNameRef": group.clone()})),
        )
        .unwrap();
    lookups
        .create(
            EntityKind::OpsMode,
            doc(json!({"opsModeName": "Cell", "opsGroupNameRef": "Retired group"})),
        )
        .unwrap();

    let mut modes = lookups.list(EntityKind::OpsMode, false).unwrap();
    enrich(&lookups, EntityKind::OpsMode, &mut modes).unwrap();
    let line = modes.iter().find(|m| m.label() == "Line").unwrap();
    assert_eq!(line.text("opsGroupNameRef__label"), Some("Assembly"));
    assert_eq!(line.text("opsGroupNameRef"), Some(group.as_str()));
    let cell = modes.iter().find(|m| m.label() == "Cell").unwrap();
    assert_eq!(cell.text("opsGroupNameRef__label"), Some("Retired group"));
}

#[test]
fn resolver_maps_project_fields_to_labels() {
    let app = app();
    let status = app
        .lookups()
        .create(
            EntityKind::ProjectStatus,
            doc(json!({"projectStatusName": "On Track"})),
        )
        .unwrap();
    let resolver = LookupResolver::new(app.lookups());
    assert_eq!(resolver.resolve("risk", &json!(status)), "On Track");
    assert_eq!(resolver.resolve("risk", &json!("unknown")), "unknown");
    assert_eq!(resolver.resolve("description", &json!("Pallets")), "Pallets");
    assert_eq!(resolver.resolve("risk", &Value::Null), "");
}

#[test]
fn import_is_all_or_nothing() {
    let app = app();
    let lookups = app.lookups();
    let bad = vec![
        doc(json!({"brandName": "ACME"})),
        doc(json!({"brandStatus": "ACTIVE"})),
    ];
    assert!(lookups.import(EntityKind::Brand, bad, "brands.csv").is_err());
    assert!(lookups.list(EntityKind::Brand, true).unwrap().is_empty());

    let good = vec![
        doc(json!({"brandName": "ACME"})),
        doc(json!({"brandName": "Globex", "brandStatus": "inactive"})),
    ];
    assert_eq!(lookups.import(EntityKind::Brand, good, "brands.csv").unwrap(), 2);
    let all = lookups.list(EntityKind::Brand, true).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|b| b.text("file_name") == Some("brands.csv")));
    assert_eq!(lookups.list(EntityKind::Brand, false).unwrap().len(), 1);
}

#[test]
fn cli_add_and_remove_lookup() {
    let app = app();
    let matches = cli::build_cli().get_matches_from([
        "savingsdesk",
        "lookup",
        "add",
        "--kind",
        "supplier",
        "--set",
        "supplierName=Steelco",
        "--set",
        "country=DE",
    ]);
    if let Some(("lookup", m)) = matches.subcommand() {
        commands::lookups::handle(&app, m).unwrap();
    } else {
        panic!("no lookup subcommand");
    }

    let suppliers = app.lookups().list(EntityKind::Supplier, false).unwrap();
    assert_eq!(suppliers.len(), 1);
    let id = suppliers[0].id.clone();

    let matches = cli::build_cli().get_matches_from([
        "savingsdesk",
        "lookup",
        "rm",
        "--kind",
        "supplier",
        "--id",
        &id,
    ]);
    if let Some(("lookup", m)) = matches.subcommand() {
        commands::lookups::handle(&app, m).unwrap();
    }
    assert!(app.lookups().list(EntityKind::Supplier, false).unwrap().is_empty());
}
