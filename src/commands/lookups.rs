// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::labels::{LABEL_SUFFIX, enrich};
use crate::registry::{ALL_KINDS, DeletePolicy, EntityKind};
use crate::utils::{maybe_print_json, pairs_to_map, pretty_table};
use anyhow::{Result, anyhow};

fn kind_arg(m: &clap::ArgMatches) -> Result<EntityKind> {
    let raw = m.get_one::<String>("kind").unwrap();
    raw.parse::<EntityKind>().map_err(|e| anyhow!(e))
}

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("kinds", _)) => {
            let rows = ALL_KINDS
                .iter()
                .map(|k| {
                    let refs = k
                        .references()
                        .iter()
                        .map(|r| format!("{} -> {}", r.local_field, r.target))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let policy = match k.delete_policy() {
                        DeletePolicy::Soft => "soft",
                        DeletePolicy::Hard => "hard",
                    };
                    vec![
                        k.collection().to_string(),
                        k.display_name().to_string(),
                        k.label_field().to_string(),
                        policy.to_string(),
                        refs,
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Kind", "Name", "Label field", "Delete", "References"], rows)
            );
        }
        Some(("list", sub)) => {
            let kind = kind_arg(sub)?;
            let lookups = app.lookups();
            let mut docs = lookups.list(kind, sub.get_flag("all"))?;
            enrich(&lookups, kind, &mut docs)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &docs)? {
                return Ok(());
            }
            let ref_fields: Vec<&str> = kind.references().iter().map(|r| r.local_field).collect();
            let mut headers = vec!["Id", "Label", "Status"];
            headers.extend(ref_fields.iter().copied());
            let rows = docs
                .iter()
                .map(|d| {
                    let mut row = vec![d.id.clone(), d.label(), d.status.clone()];
                    for f in &ref_fields {
                        let label = d
                            .text(&format!("{}{}", f, LABEL_SUFFIX))
                            .or_else(|| d.text(f))
                            .unwrap_or_default()
                            .to_string();
                        row.push(label);
                    }
                    row
                })
                .collect();
            println!("{}", pretty_table(&headers, rows));
        }
        Some(("add", sub)) => {
            let kind = kind_arg(sub)?;
            let data = pairs_to_map(sub.get_many::<String>("set").unwrap())?;
            let id = app.lookups().create(kind, data)?;
            println!("Added {} {}", kind.display_name(), id);
        }
        Some(("update", sub)) => {
            let kind = kind_arg(sub)?;
            let id = sub.get_one::<String>("id").unwrap();
            let patch = pairs_to_map(sub.get_many::<String>("set").unwrap())?;
            app.lookups().update(kind, id, patch)?;
            println!("Updated {} {}", kind.display_name(), id);
        }
        Some(("rm", sub)) => {
            let kind = kind_arg(sub)?;
            let id = sub.get_one::<String>("id").unwrap();
            match app.lookups().remove(kind, id)? {
                DeletePolicy::Soft => println!("Deactivated {} {}", kind.display_name(), id),
                DeletePolicy::Hard => println!("Deleted {} {}", kind.display_name(), id),
            }
        }
        _ => {}
    }
    Ok(())
}
