// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::feeds::PlatformDirectory;
use crate::finance::PlatformPatch;
use crate::models::{ChangeRecord, ChangeRequest, ImpactTotals};
use crate::projects;
use crate::session::EditSession;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, parse_pair, pretty_table,
};
use crate::workflow::{self, Submission};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Review {
    project_id: String,
    changes: Vec<ChangeRecord>,
    impact: ImpactTotals,
    change_request_id: Option<i64>,
}

fn pairs(sub: &clap::ArgMatches, name: &str) -> Result<Vec<(String, String)>> {
    match sub.get_many::<String>(name) {
        Some(values) => values.map(|v| parse_pair(v)).collect(),
        None => Ok(Vec::new()),
    }
}

fn print_changes(changes: &[ChangeRecord]) {
    let rows = changes
        .iter()
        .map(|c| {
            vec![
                c.section.to_string(),
                c.field.clone(),
                c.old_value.clone(),
                c.new_value.clone(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Section", "Field", "Old", "New"], rows));
}

fn print_impact(impact: &ImpactTotals) {
    println!(
        "Impact: annualized {}, year 1 {}, year 2 {}",
        fmt_money(&impact.annualized),
        fmt_money(&impact.year1),
        fmt_money(&impact.year2)
    );
}

fn review(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("project").unwrap();
    let today = chrono::Local::now().date_naive();

    let (project_id, project_desc, changes, impact) = {
        let project = projects::load_canonical(&app.conn, key)?;
        let feed = app.unit_feed()?;
        let platforms = app.platforms();
        let mut session = EditSession::open(project, feed.as_ref());

        if let Some(start) = sub.get_one::<String>("start") {
            session.set_start_date(Some(parse_date(start)?));
        }
        for (field, value) in pairs(sub, "set")? {
            if field == "startDate" {
                let start = if value.is_empty() {
                    None
                } else {
                    Some(parse_date(&value)?)
                };
                session.set_start_date(start);
            } else {
                session.set_field(&field, Value::String(value));
            }
        }
        for (block, platform) in pairs(sub, "platform")? {
            let name = if platform.is_empty() {
                None
            } else {
                platforms.platform_name(&platform)?
            };
            let patch = PlatformPatch {
                platform_ref_id: Some(Some(platform).filter(|p| !p.is_empty())),
                platform_name: Some(name),
                ..PlatformPatch::default()
            };
            session
                .update_platform_block(&block, patch)
                .with_context(|| format!("Set platform on block {}", block))?;
        }
        for (block, cost) in pairs(sub, "unit-cost")? {
            let patch = PlatformPatch {
                unit_cost: Some(parse_decimal(&cost)?),
                ..PlatformPatch::default()
            };
            session
                .update_platform_block(&block, patch)
                .with_context(|| format!("Set unit cost on block {}", block))?;
        }
        if let Some(total) = sub.get_one::<String>("fixed-total") {
            session.set_fixed_cost_annual_total(parse_decimal(total)?)?;
        }
        for (month, value) in pairs(sub, "fixed-month")? {
            session.set_fixed_cost_month(parse_month(&month)?, parse_decimal(&value)?)?;
        }

        let resolver = app.resolver(&platforms);
        let strategy = app.platform_strategy();
        let changes = session.review(&resolver, strategy.as_ref())?;
        let impact = session.impact(today);
        (
            session.project().project_id.clone(),
            session.project().description(),
            changes,
            impact,
        )
    };

    let mut change_request_id = None;
    if sub.get_flag("submit") {
        let reason = sub.get_one::<String>("reason").map(|s| s.as_str());
        let comment = sub.get_one::<String>("comment").map(|s| s.as_str());
        let submission = Submission {
            project_id: &project_id,
            project_desc: &project_desc,
            reason_code: reason,
            comment_code: comment,
            changes: &changes,
            totals: impact,
        };
        change_request_id = Some(workflow::submit(
            &mut app.conn,
            &app.settings.actor,
            &submission,
        )?);
    }

    let out = Review {
        project_id,
        changes,
        impact,
        change_request_id,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        return Ok(());
    }
    if out.changes.is_empty() {
        println!("No changes for {}", out.project_id);
    } else {
        print_changes(&out.changes);
    }
    print_impact(&out.impact);
    if let Some(id) = out.change_request_id {
        println!("Submitted change request {}", id);
    }
    Ok(())
}

fn print_request(req: &ChangeRequest) {
    println!(
        "#{} {} {} created {}{}",
        req.change_request_id,
        req.project_id,
        req.status.as_str(),
        req.created_on,
        req.approved_on
            .as_deref()
            .map(|d| format!(", approved {}", d))
            .unwrap_or_default()
    );
    let rows = req
        .fields
        .iter()
        .map(|f| {
            vec![
                f.field_name.clone(),
                f.original_value.clone(),
                f.requested_value.clone(),
                fmt_money(&f.annual_impact),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Field", "Original", "Requested", "Annual Impact"], rows)
    );
}

fn id_arg(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid change request id '{}'", raw))
}

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("review", sub)) => review(app, sub)?,
        Some(("list", sub)) => {
            let project = sub.get_one::<String>("project").unwrap();
            let requests = workflow::list(&app.conn, project)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &requests)? {
                return Ok(());
            }
            if requests.is_empty() {
                println!("No change requests for {}", project.trim());
                return Ok(());
            }
            for req in &requests {
                print_request(req);
            }
            print_impact(&workflow::summarize(&requests));
        }
        Some(("approve", sub)) => {
            let req = workflow::approve(&app.conn, id_arg(sub)?, &app.settings.actor)?;
            println!("Change request {} {}", req.change_request_id, req.status.as_str());
        }
        Some(("reject", sub)) => {
            let req = workflow::reject(&app.conn, id_arg(sub)?, &app.settings.actor)?;
            println!("Change request {} {}", req.change_request_id, req.status.as_str());
        }
        _ => {}
    }
    Ok(())
}
