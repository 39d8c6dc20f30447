// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::finance::FinancialAggregate;
use crate::models::YearMonth;
use crate::projects;
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("projection", sub)) => export_projection(app, sub),
        _ => Ok(()),
    }
}

struct MonthRow {
    month: YearMonth,
    platforms: Vec<Decimal>,
    fixed: Decimal,
    total: Decimal,
}

fn month_rows(agg: &FinancialAggregate) -> Vec<MonthRow> {
    let months = agg.window().map(|w| w.months().to_vec()).unwrap_or_default();
    months
        .into_iter()
        .map(|month| {
            let platforms: Vec<Decimal> = agg
                .blocks()
                .iter()
                .map(|b| b.monthly_savings.get(&month).copied().unwrap_or(Decimal::ZERO))
                .collect();
            let fixed = agg
                .fixed_cost()
                .monthly
                .get(&month)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let total = platforms.iter().copied().sum::<Decimal>() + fixed;
            MonthRow {
                month,
                platforms,
                fixed,
                total,
            }
        })
        .collect()
}

fn export_projection(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let key = sub.get_one::<String>("project").unwrap();
    let project = projects::load_canonical(&app.conn, key)?;
    let feed = app.unit_feed()?;
    let agg = project.aggregate(feed.as_ref());
    let rows = month_rows(&agg);
    let block_names: Vec<String> = agg
        .blocks()
        .iter()
        .map(|b| b.platform_name.clone().unwrap_or_else(|| b.id.clone()))
        .collect();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            let mut header = vec!["month".to_string()];
            header.extend(block_names.iter().cloned());
            header.push("fixed_cost".into());
            header.push("total".into());
            wtr.write_record(&header)?;
            for r in &rows {
                let mut rec = vec![r.month.to_string()];
                rec.extend(r.platforms.iter().map(|d| d.round_dp(2).to_string()));
                rec.push(r.fixed.round_dp(2).to_string());
                rec.push(r.total.round_dp(2).to_string());
                wtr.write_record(&rec)?;
            }
            wtr.flush()?;
        }
        _ => {
            let months: Vec<_> = rows
                .iter()
                .map(|r| {
                    let platforms: BTreeMap<&str, String> = agg
                        .blocks()
                        .iter()
                        .zip(&r.platforms)
                        .map(|(b, d)| (b.id.as_str(), d.round_dp(2).to_string()))
                        .collect();
                    json!({
                        "month": r.month.to_string(),
                        "platforms": platforms,
                        "fixed_cost": r.fixed.round_dp(2).to_string(),
                        "total": r.total.round_dp(2).to_string(),
                    })
                })
                .collect();
            let totals = agg.totals();
            let yearly: BTreeMap<String, String> = totals
                .yearly
                .iter()
                .map(|(y, v)| (y.to_string(), v.round_dp(2).to_string()))
                .collect();
            let doc = json!({
                "project_id": project.project_id,
                "months": months,
                "annualized": totals.annualized.round_dp(2).to_string(),
                "weighted_unit_cost": totals.weighted_unit_cost.round_dp(4).to_string(),
                "yearly": yearly,
            });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    println!("Exported projection for {} to {}", project.project_id, out);
    Ok(())
}
