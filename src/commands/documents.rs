// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::projects::read_upload;
use crate::app::App;
use crate::documents;
use crate::projects;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("attach", sub)) => {
            let key = sub.get_one::<String>("project").unwrap();
            let doc_type = sub.get_one::<String>("type").unwrap();
            let path = sub.get_one::<String>("path").unwrap();
            let project = projects::load_canonical(&app.conn, key)?;
            let upload = read_upload(doc_type, path)?;
            let meta = documents::attach(&app.conn, &project.id, &upload, &app.settings.actor)?;
            println!(
                "Attached {} ({}) to {} as {}",
                meta.file_name, meta.doc_type, project.project_id, meta.id
            );
        }
        Some(("list", sub)) => {
            let key = sub.get_one::<String>("project").unwrap();
            let project = projects::load_canonical(&app.conn, key)?;
            let docs = documents::list(&app.conn, &project.id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &docs)? {
                return Ok(());
            }
            let rows = docs
                .into_iter()
                .map(|d| vec![d.id, d.doc_type, d.file_name, d.uploaded_by, d.uploaded_on])
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "Type", "File", "Uploaded By", "Uploaded On"], rows)
            );
        }
        Some(("fetch", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let out = sub.get_one::<String>("out").unwrap();
            let (meta, content) = documents::fetch(&app.conn, id.trim())?;
            std::fs::write(out, &content).with_context(|| format!("Write {}", out))?;
            println!("Saved {} ({} bytes) to {}", meta.file_name, content.len(), out);
        }
        _ => {}
    }
    Ok(())
}
