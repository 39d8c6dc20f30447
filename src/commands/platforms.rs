// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::feeds::PlatformDirectory;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::params;
use serde_json::json;

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let pool = sub.get_one::<String>("pool").unwrap().trim().to_uppercase();
            let group = sub.get_one::<String>("group").map(|s| s.trim());
            let fg = sub.get_one::<String>("fg").map(|s| s.trim());
            match pool.as_str() {
                "DIRECT" if group.is_none() => bail!("direct platforms need --group"),
                "COMMON" if fg.is_none() => bail!("common platforms need --fg"),
                "DIRECT" | "COMMON" => {}
                other => bail!("Unknown pool '{}' (use direct|common)", other),
            }
            app.conn.execute(
                "INSERT INTO platforms(id, name, pool, platform_group, functional_group)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET name=excluded.name, pool=excluded.pool,
                    platform_group=excluded.platform_group, functional_group=excluded.functional_group",
                params![id, name, pool, group, fg],
            )?;
            println!("Saved platform {} '{}' ({})", id, name, pool);
        }
        Some(("map-group", sub)) => {
            let fg = sub.get_one::<String>("fg").unwrap().trim();
            let group = sub.get_one::<String>("group").unwrap().trim();
            app.conn.execute(
                "INSERT OR IGNORE INTO fg_platform_groups(functional_group_id, platform_group) VALUES (?1, ?2)",
                params![fg, group],
            )?;
            println!("Mapped functional group {} to platform group {}", fg, group);
        }
        Some(("list", sub)) => {
            let fg = sub.get_one::<String>("fg").unwrap();
            let options = app.platforms().platforms_for(fg)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &options)? {
                return Ok(());
            }
            let rows = options
                .into_iter()
                .map(|o| vec![o.platform_id, o.platform_name, o.category.as_str().to_string()])
                .collect();
            println!("{}", pretty_table(&["Id", "Name", "Category"], rows));
        }
        Some(("units", sub)) => {
            let platform = sub.get_one::<String>("platform").unwrap().trim();
            let feed = app.unit_feed()?;
            let units = feed.monthly_units(platform)?;
            if sub.get_flag("json") || sub.get_flag("jsonl") {
                let items: Vec<_> = units
                    .iter()
                    .map(|(m, u)| json!({"month": m, "units": u}))
                    .collect();
                maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)?;
                return Ok(());
            }
            let rows = units
                .iter()
                .map(|(m, u)| vec![m.to_string(), u.to_string()])
                .collect();
            println!("{}", pretty_table(&["Month", "Units"], rows));
        }
        _ => {}
    }
    Ok(())
}
