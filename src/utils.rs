// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::YearMonth;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

const UA: &str = concat!(
    "savingsdesk/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/savingsdesk)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Date at the start of a stored value such as `2025-01-14T00:00:00.000Z`.
pub fn parse_start_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub fn parse_month(s: &str) -> Result<YearMonth> {
    s.parse::<YearMonth>().map_err(|e| anyhow!(e))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Split a `key=value` CLI argument.
pub fn parse_pair(s: &str) -> Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected key=value, got '{}'", s))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(anyhow!("Empty key in '{}'", s));
    }
    Ok((k.to_string(), v.trim().to_string()))
}

/// `key=value` arguments as a JSON object of string values.
pub fn pairs_to_map<'a>(
    pairs: impl IntoIterator<Item = &'a String>,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut out = serde_json::Map::new();
    for raw in pairs {
        let (k, v) = parse_pair(raw)?;
        out.insert(k, serde_json::Value::String(v));
    }
    Ok(out)
}

/// Decimal read back from a TEXT column. An unparseable value counts as zero
/// and is logged with the column it came from.
pub fn stored_decimal(raw: &str, column: &str) -> Decimal {
    match raw.trim().parse::<Decimal>() {
        Ok(d) => d,
        Err(e) => {
            log::warn!("Corrupt decimal '{}' in {} ({}); reading it as 0", raw, column, e);
            Decimal::ZERO
        }
    }
}

pub fn fmt_money(d: &Decimal) -> String {
    d.round_dp(2).to_string()
}

/// Audit timestamp in UTC with millisecond precision.
pub fn now_stamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
