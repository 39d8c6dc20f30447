// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::feeds::{MonthlyUnitFeed, PlatformDirectory};
use crate::finance::{FinancialAggregate, PlatformPatch};
use crate::projects;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};
use anyhow::Result;

pub(crate) fn print_financial(agg: &FinancialAggregate) {
    match agg.window() {
        Some(w) => println!(
            "Window {} .. {} ({} months)",
            w.start(),
            w.end(),
            w.months().len()
        ),
        None => println!("No start date; projections are empty"),
    }

    let blocks = agg
        .blocks()
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.platform_name
                    .clone()
                    .or_else(|| b.platform_ref_id.clone())
                    .unwrap_or_else(|| "-".into()),
                b.unit_cost.to_string(),
                b.computed_volume.round_dp(2).to_string(),
                fmt_money(&b.annualized_savings),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Block", "Platform", "Unit Cost", "Volume", "Annualized"], blocks)
    );

    let fixed = agg.fixed_cost();
    if !fixed.monthly.is_empty() {
        let rows = fixed
            .monthly
            .iter()
            .map(|(m, v)| vec![m.label(), fmt_money(v)])
            .collect();
        println!("Fixed cost ({})", fixed.mode.as_str());
        println!("{}", pretty_table(&["Month", "Savings"], rows));
    }

    let t = agg.totals();
    let mut rows = vec![
        vec!["Annualized".to_string(), fmt_money(&t.annualized)],
        vec!["Weighted unit cost".to_string(), t.weighted_unit_cost.round_dp(4).to_string()],
        vec!["Total volume".to_string(), t.total_volume.round_dp(2).to_string()],
    ];
    for (y, v) in &t.yearly {
        rows.push(vec![y.to_string(), fmt_money(v)]);
    }
    println!("{}", pretty_table(&["Total", "Value"], rows));
}

/// Load, apply one edit, persist. Last write wins.
fn edit<F>(app: &mut App, key: &str, op: F) -> Result<()>
where
    F: FnOnce(&mut FinancialAggregate, &dyn MonthlyUnitFeed) -> Result<String>,
{
    let project = projects::load_canonical(&app.conn, key)?;
    let (aggregate, message) = {
        let feed = app.unit_feed()?;
        let mut aggregate = project.aggregate(feed.as_ref());
        let message = op(&mut aggregate, feed.as_ref())?;
        (aggregate, message)
    };
    projects::save_financial(&mut app.conn, &project, &aggregate, &app.settings.actor)?;
    println!("{}", message);

    let saved = projects::load_canonical(&app.conn, key)?;
    let feed = app.unit_feed()?;
    print_financial(&saved.aggregate(feed.as_ref()));
    Ok(())
}

fn block_arg(sub: &clap::ArgMatches) -> String {
    sub.get_one::<String>("block").unwrap().trim().to_string()
}

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let key = sub.get_one::<String>("project").unwrap().clone();

    match name {
        "show" => {
            let project = projects::load_canonical(&app.conn, &key)?;
            let feed = app.unit_feed()?;
            let aggregate = project.aggregate(feed.as_ref());
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &aggregate)? {
                return Ok(());
            }
            print_financial(&aggregate);
        }
        "add-block" => {
            let platform = sub.get_one::<String>("platform").map(|s| s.trim().to_string());
            let platform_name = match platform.as_deref() {
                Some(p) => app.platforms().platform_name(p)?,
                None => None,
            };
            let unit_cost = sub
                .get_one::<String>("unit-cost")
                .map(|s| parse_decimal(s))
                .transpose()?;
            let volume = sub
                .get_one::<String>("volume")
                .map(|s| parse_decimal(s))
                .transpose()?;
            edit(app, &key, |agg, feed| {
                let id = agg.add_platform_block();
                let patch = PlatformPatch {
                    platform_ref_id: platform.map(Some),
                    platform_name: platform_name.map(Some),
                    unit_cost,
                    total_volume_raw: volume,
                };
                agg.update_platform_block(&id, patch, feed)?;
                Ok("Added platform block".to_string())
            })?;
        }
        "set-platform" => {
            let block = block_arg(sub);
            let platform = sub.get_one::<String>("platform").unwrap().trim().to_string();
            let platform_name = if platform.is_empty() {
                None
            } else {
                app.platforms().platform_name(&platform)?
            };
            edit(app, &key, |agg, feed| {
                let patch = PlatformPatch {
                    platform_ref_id: Some(Some(platform.clone()).filter(|p| !p.is_empty())),
                    platform_name: Some(platform_name),
                    ..PlatformPatch::default()
                };
                agg.update_platform_block(&block, patch, feed)?;
                Ok(format!("Block {} now uses platform '{}'", block, platform))
            })?;
        }
        "set-unit-cost" => {
            let block = block_arg(sub);
            let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
            edit(app, &key, |agg, feed| {
                let patch = PlatformPatch {
                    unit_cost: Some(value),
                    ..PlatformPatch::default()
                };
                agg.update_platform_block(&block, patch, feed)?;
                Ok(format!("Block {} unit cost set to {}", block, value))
            })?;
        }
        "set-volume" => {
            let block = block_arg(sub);
            let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
            edit(app, &key, |agg, feed| {
                let patch = PlatformPatch {
                    total_volume_raw: Some(value),
                    ..PlatformPatch::default()
                };
                agg.update_platform_block(&block, patch, feed)?;
                Ok(format!("Block {} volume set to {}", block, value))
            })?;
        }
        "rm-block" => {
            let block = block_arg(sub);
            edit(app, &key, |agg, _| {
                agg.remove_platform_block(&block)?;
                Ok(format!("Removed block {}", block))
            })?;
        }
        "set-start" => {
            let start = if sub.get_flag("clear") {
                None
            } else {
                match sub.get_one::<String>("date") {
                    Some(d) => Some(parse_date(d)?),
                    None => anyhow::bail!("Pass --date YYYY-MM-DD or --clear"),
                }
            };
            edit(app, &key, |agg, _| {
                agg.set_start_date(start);
                Ok(match start {
                    Some(d) => format!("Start date set to {}", d),
                    None => "Start date cleared".to_string(),
                })
            })?;
        }
        "set-fixed-total" => {
            let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
            edit(app, &key, |agg, _| {
                agg.set_fixed_cost_annual_total(value)?;
                Ok(format!("Fixed cost annual total set to {} (AUTO)", value))
            })?;
        }
        "set-fixed-month" => {
            let month = parse_month(sub.get_one::<String>("month").unwrap())?;
            let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
            edit(app, &key, |agg, _| {
                agg.set_fixed_cost_month(month, value)?;
                Ok(format!("Fixed cost for {} set to {} (MANUAL)", month, value))
            })?;
        }
        _ => {}
    }
    Ok(())
}
