// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Platform directory and monthly-unit feed collaborators.

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::{PlatformCategory, PlatformOption, YearMonth};
use crate::utils::http_client;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

pub trait MonthlyUnitFeed {
    /// Unit quantity per calendar month for one platform.
    fn monthly_units(&self, platform_id: &str) -> Result<BTreeMap<YearMonth, Decimal>>;
}

pub trait PlatformDirectory {
    /// Platforms visible to a functional group. Direct platforms win when the
    /// group has any platform-group mapping; otherwise the common pool.
    fn platforms_for(&self, functional_group_id: &str) -> Result<Vec<PlatformOption>>;

    fn platform_name(&self, platform_id: &str) -> Result<Option<String>>;
}

/// Feed with no data. Used when a project is inspected offline.
pub struct EmptyFeed;

impl MonthlyUnitFeed for EmptyFeed {
    fn monthly_units(&self, _platform_id: &str) -> Result<BTreeMap<YearMonth, Decimal>> {
        Ok(BTreeMap::new())
    }
}

pub struct SqlitePlatforms<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePlatforms<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl MonthlyUnitFeed for SqlitePlatforms<'_> {
    fn monthly_units(&self, platform_id: &str) -> Result<BTreeMap<YearMonth, Decimal>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT month, units FROM platform_monthly_units WHERE platform_id=?1")?;
        let rows = stmt.query_map(params![platform_id], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        let mut out = BTreeMap::new();
        for row in rows {
            let (m, u) = row?;
            let month = YearMonth::parse_loose(&m).ok_or_else(|| {
                AppError::ExternalFetch(format!("Invalid month '{}' for platform {}", m, platform_id))
            })?;
            let units = u.parse::<Decimal>().map_err(|e| {
                AppError::ExternalFetch(format!("Invalid units '{}' for platform {}: {}", u, platform_id, e))
            })?;
            out.insert(month, units);
        }
        Ok(out)
    }
}

impl PlatformDirectory for SqlitePlatforms<'_> {
    fn platforms_for(&self, functional_group_id: &str) -> Result<Vec<PlatformOption>> {
        let fg = functional_group_id.trim();
        if fg.is_empty() {
            return Err(AppError::validation("functional group is required"));
        }

        let mut groups_stmt = self.conn.prepare_cached(
            "SELECT platform_group FROM fg_platform_groups WHERE functional_group_id=?1",
        )?;
        let groups = groups_stmt
            .query_map(params![fg], |r| r.get::<_, Option<String>>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::new();
        if !groups.is_empty() {
            let groups: Vec<String> = groups.into_iter().flatten().collect();
            let mut stmt = self.conn.prepare_cached(
                "SELECT id, name FROM platforms WHERE pool='DIRECT' AND platform_group=?1 ORDER BY name",
            )?;
            for g in &groups {
                let rows = stmt.query_map(params![g], |r| {
                    Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (platform_id, platform_name) = row?;
                    out.push(PlatformOption {
                        platform_id,
                        platform_name,
                        category: PlatformCategory::Direct,
                    });
                }
            }
        } else {
            let mut stmt = self.conn.prepare_cached(
                "SELECT id, name FROM platforms WHERE pool='COMMON' AND functional_group=?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![fg], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (platform_id, platform_name) = row?;
                out.push(PlatformOption {
                    platform_id,
                    platform_name,
                    category: PlatformCategory::Common,
                });
            }
        }
        Ok(out)
    }

    fn platform_name(&self, platform_id: &str) -> Result<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM platforms WHERE id=?1",
                params![platform_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(name)
    }
}

#[derive(Debug, Deserialize)]
struct MonthlyResponse {
    #[serde(default)]
    months: BTreeMap<String, serde_json::Value>,
}

/// Unit feed served over HTTP: `GET {base}/api/financial/platform-monthly?platformId=..`.
pub struct HttpUnitFeed {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpUnitFeed {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = http_client().map_err(|e| AppError::ExternalFetch(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl MonthlyUnitFeed for HttpUnitFeed {
    fn monthly_units(&self, platform_id: &str) -> Result<BTreeMap<YearMonth, Decimal>> {
        let url = format!("{}/api/financial/platform-monthly", self.base_url);
        let body: MonthlyResponse = self
            .client
            .get(url)
            .query(&[("platformId", platform_id)])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| AppError::ExternalFetch(format!("platform {}: {}", platform_id, e)))?;

        let mut out = BTreeMap::new();
        for (key, value) in body.months {
            let Some(month) = YearMonth::parse_loose(&key) else {
                log::warn!("Skipping unparseable feed month '{}' for platform {}", key, platform_id);
                continue;
            };
            let units = match &value {
                serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
                serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
                _ => None,
            };
            out.insert(month, units.unwrap_or(Decimal::ZERO));
        }
        Ok(out)
    }
}

/// Pick the unit feed configured for this installation.
pub fn unit_feed<'a>(conn: &'a Connection, settings: &Settings) -> Result<Box<dyn MonthlyUnitFeed + 'a>> {
    match settings.feed_url.as_deref() {
        Some(url) => Ok(Box::new(HttpUnitFeed::new(url)?)),
        None => Ok(Box::new(SqlitePlatforms::new(conn))),
    }
}
