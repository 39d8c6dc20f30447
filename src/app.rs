// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::db;
use crate::diff::{PlatformChangeStrategy, strategy_for};
use crate::error::Result;
use crate::feeds::{MonthlyUnitFeed, SqlitePlatforms, unit_feed};
use crate::labels::LookupResolver;
use crate::lookups::{LookupCache, Lookups};
use rusqlite::Connection;

/// Composition root: the connection, settings and the lookup cache.
pub struct App {
    pub conn: Connection,
    pub settings: Settings,
    lookup_cache: LookupCache,
}

impl App {
    pub fn open() -> anyhow::Result<Self> {
        let conn = db::open_or_init()?;
        Ok(Self::from_connection(conn)?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        db::init_schema(&conn)?;
        let settings = Settings::load(&conn)?;
        let lookup_cache = LookupCache::new(settings.cache_ttl);
        Ok(Self {
            conn,
            settings,
            lookup_cache,
        })
    }

    /// Re-read settings after a change; the cache restarts with the new TTL.
    pub fn reload_settings(&mut self) -> Result<()> {
        self.settings = Settings::load(&self.conn)?;
        self.lookup_cache = LookupCache::new(self.settings.cache_ttl);
        Ok(())
    }

    pub fn lookup_cache(&self) -> &LookupCache {
        &self.lookup_cache
    }

    pub fn lookups(&self) -> Lookups<'_> {
        Lookups::new(&self.conn, &self.lookup_cache, &self.settings.actor)
    }

    pub fn platforms(&self) -> SqlitePlatforms<'_> {
        SqlitePlatforms::new(&self.conn)
    }

    pub fn unit_feed(&self) -> Result<Box<dyn MonthlyUnitFeed + '_>> {
        unit_feed(&self.conn, &self.settings)
    }

    pub fn resolver<'a>(&'a self, platforms: &'a SqlitePlatforms<'a>) -> LookupResolver<'a> {
        LookupResolver::new(self.lookups()).with_platforms(platforms)
    }

    pub fn platform_strategy(&self) -> Box<dyn PlatformChangeStrategy> {
        strategy_for(self.settings.platform_diff)
    }
}
