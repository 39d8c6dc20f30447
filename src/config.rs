// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{AppError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::time::Duration;

pub const KEY_ACTOR: &str = "actor";
pub const KEY_CACHE_TTL: &str = "cache_ttl_secs";
pub const KEY_FEED_URL: &str = "feed_url";
pub const KEY_PLATFORM_DIFF: &str = "platform_diff";

pub const KNOWN_KEYS: [&str; 4] = [KEY_ACTOR, KEY_CACHE_TTL, KEY_FEED_URL, KEY_PLATFORM_DIFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformDiffMode {
    WholeList,
    SingleBlock,
}

impl PlatformDiffMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "whole-list" => Some(PlatformDiffMode::WholeList),
            "single-block" => Some(PlatformDiffMode::SingleBlock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub actor: String,
    pub cache_ttl: Duration,
    pub feed_url: Option<String>,
    pub platform_diff: PlatformDiffMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            actor: "admin".to_string(),
            cache_ttl: Duration::from_secs(30),
            feed_url: None,
            platform_diff: PlatformDiffMode::WholeList,
        }
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(actor) = get_setting(conn, KEY_ACTOR)? {
            s.actor = actor;
        }
        if let Some(ttl) = get_setting(conn, KEY_CACHE_TTL)? {
            let secs = ttl.trim().parse::<u64>().map_err(|_| {
                AppError::validation(format!("Invalid {} '{}'", KEY_CACHE_TTL, ttl))
            })?;
            s.cache_ttl = Duration::from_secs(secs);
        }
        s.feed_url = get_setting(conn, KEY_FEED_URL)?.filter(|u| !u.trim().is_empty());
        if let Some(mode) = get_setting(conn, KEY_PLATFORM_DIFF)? {
            s.platform_diff = PlatformDiffMode::parse(&mode).ok_or_else(|| {
                AppError::validation(format!("Invalid {} '{}'", KEY_PLATFORM_DIFF, mode))
            })?;
        }
        Ok(s)
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Validate and store a setting.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let key = key.trim();
    let value = value.trim();
    match key {
        KEY_ACTOR if value.is_empty() => {
            return Err(AppError::validation("actor cannot be empty"));
        }
        KEY_CACHE_TTL if value.parse::<u64>().is_err() => {
            return Err(AppError::validation(format!(
                "{} must be a whole number of seconds",
                KEY_CACHE_TTL
            )));
        }
        KEY_PLATFORM_DIFF if PlatformDiffMode::parse(value).is_none() => {
            return Err(AppError::validation(format!(
                "{} must be 'whole-list' or 'single-block'",
                KEY_PLATFORM_DIFF
            )));
        }
        k if !KNOWN_KEYS.contains(&k) => {
            return Err(AppError::validation(format!("Unknown setting '{}'", k)));
        }
        _ => {}
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}
