// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::finance::check_quantity;
use crate::projects::insert_legacy;
use crate::registry::EntityKind;
use crate::utils::{parse_decimal, parse_month};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::params;
use serde_json::{Map, Value};
use std::path::Path;

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("units", sub)) => import_units(app, sub),
        Some(("lookups", sub)) => import_lookups(app, sub),
        Some(("legacy", sub)) => import_legacy(app, sub),
        _ => Ok(()),
    }
}

fn import_units(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = app.conn.transaction()?;
    let mut n = 0usize;
    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let platform = rec.get(0).context("platform_id missing")?.trim().to_string();
        let month_raw = rec.get(1).context("month missing")?.trim().to_string();
        let units_raw = rec.get(2).context("units missing")?.trim().to_string();
        if platform.is_empty() {
            return Err(anyhow!("Empty platform_id on row {}", line + 1));
        }
        let month = parse_month(month_raw.get(..7).unwrap_or(month_raw.as_str()))
            .with_context(|| format!("Invalid month '{}' on row {}", month_raw, line + 1))?;
        let units = parse_decimal(&units_raw)
            .and_then(|u| check_quantity("units", u).map_err(anyhow::Error::from))
            .with_context(|| format!("Invalid units '{}' for {} on row {}", units_raw, platform, line + 1))?;

        tx.execute(
            "INSERT INTO platform_monthly_units(platform_id, month, units) VALUES (?1, ?2, ?3)
             ON CONFLICT(platform_id, month) DO UPDATE SET units=excluded.units",
            params![platform, month.to_string(), units.to_string()],
        )?;
        n += 1;
    }
    tx.commit()?;
    println!("Imported {} monthly unit rows from {}", n, path);
    Ok(())
}

fn import_lookups(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let kind = sub
        .get_one::<String>("kind")
        .unwrap()
        .parse::<EntityKind>()
        .map_err(|e| anyhow!(e))?;
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut records = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let mut data = Map::new();
        for (h, v) in headers.iter().zip(rec.iter()) {
            let v = v.trim();
            if !h.is_empty() && !v.is_empty() {
                data.insert(h.clone(), Value::String(v.to_string()));
            }
        }
        records.push(data);
    }

    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    let n = app.lookups().import(kind, records, &file_name)?;
    println!("Imported {} {} records from {}", n, kind.display_name(), path);
    Ok(())
}

fn import_legacy(app: &mut App, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
    let docs: Vec<Map<String, Value>> =
        serde_json::from_str(&raw).with_context(|| format!("Parse {} as a JSON array", path))?;

    let tx = app.conn.transaction()?;
    for doc in &docs {
        insert_legacy(&tx, doc)?;
    }
    tx.commit()?;
    println!("Imported {} legacy projects from {}", docs.len(), path);
    Ok(())
}
