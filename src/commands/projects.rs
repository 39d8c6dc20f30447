// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::financial::print_financial;
use crate::app::App;
use crate::diff::coerce;
use crate::documents::DocumentUpload;
use crate::finance::FinancialAggregate;
use crate::ids::{next_project_id, project_id_exists, project_id_prefix};
use crate::projects::{self, NewProject};
use crate::utils::{
    fmt_money, maybe_print_json, pairs_to_map, parse_date, parse_decimal, parse_pair, pretty_table,
};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

#[derive(Serialize)]
struct ProjectView<'a> {
    project: &'a projects::CanonicalProject,
    financial: &'a FinancialAggregate,
}

pub(crate) fn read_upload(doc_type: &str, path: &str) -> Result<DocumentUpload> {
    let content = std::fs::read(path).with_context(|| format!("Read {}", path))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    Ok(DocumentUpload {
        doc_type: doc_type.to_string(),
        file_name,
        content,
    })
}

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("next-id", sub)) => {
            let fg = sub.get_one::<String>("fg").unwrap();
            let on = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?,
                None => chrono::Local::now().date_naive(),
            };
            let prefix = project_id_prefix(fg, on);
            println!("{}", next_project_id(&app.conn, &prefix)?);
        }
        Some(("check-id", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            if project_id_exists(&app.conn, id)? {
                println!("{} is taken", id.trim());
            } else {
                println!("{} is available", id.trim());
            }
        }
        Some(("create", sub)) => {
            let mut metadata = match sub.get_many::<String>("set") {
                Some(pairs) => pairs_to_map(pairs)?,
                None => serde_json::Map::new(),
            };
            if let Some(pid) = sub.get_one::<String>("project-id") {
                metadata.insert("projectId".into(), Value::String(pid.trim().to_string()));
            }
            if let Some(desc) = sub.get_one::<String>("description") {
                metadata.insert("description".into(), Value::String(desc.clone()));
            }
            let start = match sub.get_one::<String>("start") {
                Some(s) => Some(parse_date(s)?),
                None => None,
            };
            if let Some(d) = start {
                metadata.insert(
                    "startDate".into(),
                    Value::String(d.format("%Y-%m-%d").to_string()),
                );
            }

            let mut aggregate = FinancialAggregate::new(start);
            if let Some(total) = sub.get_one::<String>("fixed-total") {
                aggregate.set_fixed_cost_annual_total(parse_decimal(total)?)?;
            }
            let mut documents = Vec::new();
            if let Some(docs) = sub.get_many::<String>("doc") {
                for raw in docs {
                    let (doc_type, path) = parse_pair(raw)?;
                    documents.push(read_upload(&doc_type, &path)?);
                }
            }

            let new = NewProject {
                metadata,
                financial: aggregate.snapshot(),
                fixed_cost_mode: Some(aggregate.fixed_cost().mode),
                documents,
            };
            let created = projects::create(&mut app.conn, &app.settings.actor, new)?;
            println!(
                "Created project {} (#{}, id {})",
                created.project_id, created.project_number, created.id
            );
        }
        Some(("show", sub)) => {
            let key = sub.get_one::<String>("project").unwrap();
            let project = projects::load_canonical(&app.conn, key)?;
            let feed = app.unit_feed()?;
            let aggregate = project.aggregate(feed.as_ref());
            let payload = ProjectView {
                project: &project,
                financial: &aggregate,
            };
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payload)? {
                return Ok(());
            }
            let rows = project
                .metadata
                .iter()
                .map(|(k, v)| vec![k.clone(), coerce(v)])
                .collect();
            println!(
                "{} [{}] {}",
                project.project_id,
                project.origin.as_str(),
                project.description()
            );
            println!("{}", pretty_table(&["Field", "Value"], rows));
            print_financial(&aggregate);
        }
        Some(("list", sub)) => {
            let rows = projects::list_merged(&app.conn)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
                return Ok(());
            }
            let data = rows
                .into_iter()
                .map(|p| {
                    vec![
                        p.project_id,
                        p.description,
                        p.start_date.unwrap_or_default(),
                        fmt_money(&p.estimated_annualized_savings),
                        p.source.as_str().to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Project", "Description", "Start", "Est. Annualized", "Source"],
                    data
                )
            );
        }
        _ => {}
    }
    Ok(())
}
