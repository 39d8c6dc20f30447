// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::proration::{prorate_units, split_fixed_cost};
use super::limits::{check_amount, check_quantity};
use super::savings::{calculate_monthly_savings, saturating_sum, sum_by_year};
use super::window::ProjectWindow;
use crate::error::{AppError, Result};
use crate::feeds::MonthlyUnitFeed;
use crate::models::{FinancialSnapshot, FixedCostEntry, FixedCostMode, PlatformRow, YearMonth};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One volume-based savings source with its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformBlock {
    pub id: String,
    pub platform_ref_id: Option<String>,
    pub platform_name: Option<String>,
    pub unit_cost: Decimal,
    pub total_volume_raw: Decimal,
    pub monthly_units: BTreeMap<YearMonth, Decimal>,
    pub monthly_savings: BTreeMap<YearMonth, Decimal>,
    pub annualized_savings: Decimal,
    pub computed_volume: Decimal,
}

impl PlatformBlock {
    fn empty(id: String) -> Self {
        Self {
            id,
            platform_ref_id: None,
            platform_name: None,
            unit_cost: Decimal::ZERO,
            total_volume_raw: Decimal::ZERO,
            monthly_units: BTreeMap::new(),
            monthly_savings: BTreeMap::new(),
            annualized_savings: Decimal::ZERO,
            computed_volume: Decimal::ZERO,
        }
    }

    /// Legacy blocks carry a raw total but no platform feed.
    pub fn is_placeholder(&self) -> bool {
        self.platform_ref_id.is_none() && self.monthly_units.is_empty()
    }
}

/// Field updates for [`FinancialAggregate::update_platform_block`].
/// `platform_ref_id: Some(None)` clears the reference.
#[derive(Debug, Clone, Default)]
pub struct PlatformPatch {
    pub platform_ref_id: Option<Option<String>>,
    pub platform_name: Option<Option<String>>,
    pub unit_cost: Option<Decimal>,
    pub total_volume_raw: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedCost {
    pub mode: FixedCostMode,
    pub annual_total: Decimal,
    pub monthly: BTreeMap<YearMonth, Decimal>,
}

impl Default for FixedCost {
    fn default() -> Self {
        Self {
            mode: FixedCostMode::Manual,
            annual_total: Decimal::ZERO,
            monthly: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub weighted_unit_cost: Decimal,
    pub annualized: Decimal,
    pub volume_annualized: Decimal,
    pub total_volume: Decimal,
    pub yearly: BTreeMap<i32, Decimal>,
}

/// Financial picture of one project. Every mutation ends with a full
/// recompute, so `totals()` always reflects the current inputs.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialAggregate {
    start: Option<NaiveDate>,
    window: Option<ProjectWindow>,
    blocks: Vec<PlatformBlock>,
    fixed_cost: FixedCost,
    totals: Totals,
    #[serde(skip)]
    next_temp: u64,
}

impl FinancialAggregate {
    pub fn new(start: Option<NaiveDate>) -> Self {
        let mut agg = Self {
            start,
            window: start.and_then(ProjectWindow::new),
            blocks: Vec::new(),
            fixed_cost: FixedCost::default(),
            totals: Totals::default(),
            next_temp: 1,
        };
        agg.recompute();
        agg
    }

    /// Rebuild from persisted rows. Blocks with a platform reference pull
    /// their monthly units from `feed`.
    pub fn hydrate(
        start: Option<NaiveDate>,
        rows: &[PlatformRow],
        fixed: &[FixedCostEntry],
        mode: FixedCostMode,
        feed: &dyn MonthlyUnitFeed,
    ) -> Self {
        let mut agg = Self::new(start);
        for row in rows {
            let mut block = PlatformBlock::empty(row.id.clone());
            block.platform_ref_id = row.platform_ref_id.clone().filter(|s| !s.is_empty());
            block.platform_name = row.platform_name.clone();
            block.unit_cost = row.unit_cost;
            block.total_volume_raw = row.total_volume;
            if let Some(pid) = block.platform_ref_id.as_deref() {
                block.monthly_units = fetch_units(feed, pid);
            }
            agg.blocks.push(block);
        }
        agg.fixed_cost = FixedCost {
            mode,
            annual_total: saturating_sum(fixed.iter().map(|f| f.savings)),
            monthly: fixed.iter().map(|f| (f.month, f.savings)).collect(),
        };
        agg.recompute();
        agg
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn window(&self) -> Option<&ProjectWindow> {
        self.window.as_ref()
    }

    pub fn blocks(&self) -> &[PlatformBlock] {
        &self.blocks
    }

    pub fn block(&self, id: &str) -> Option<&PlatformBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn fixed_cost(&self) -> &FixedCost {
        &self.fixed_cost
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Append an empty, unsaved block and return its id.
    pub fn add_platform_block(&mut self) -> String {
        let id = format!("temp-{}", self.next_temp);
        self.next_temp += 1;
        self.blocks.push(PlatformBlock::empty(id.clone()));
        self.recompute();
        id
    }

    /// Merge `patch` into a block. Unit cost and volume must be
    /// non-negative and in range; a raw volume only applies to blocks without
    /// a platform, whose volume otherwise comes from the feed. Nothing changes
    /// when validation fails.
    pub fn update_platform_block(
        &mut self,
        id: &str,
        patch: PlatformPatch,
        feed: &dyn MonthlyUnitFeed,
    ) -> Result<()> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::not_found(format!("platform block '{}'", id)))?;

        let new_ref = patch
            .platform_ref_id
            .map(|r| r.filter(|s| !s.trim().is_empty()));
        if let Some(cost) = patch.unit_cost {
            check_quantity("unit cost", cost)?;
        }
        if let Some(vol) = patch.total_volume_raw {
            check_quantity("volume", vol)?;
            let platform = new_ref.as_ref().unwrap_or(&block.platform_ref_id);
            if let Some(pid) = platform {
                return Err(AppError::validation(format!(
                    "block '{}' takes its volume from platform {}; volume applies only to blocks without a platform",
                    id, pid
                )));
            }
        }

        if let Some(new_ref) = new_ref {
            if new_ref != block.platform_ref_id {
                block.monthly_units = match new_ref.as_deref() {
                    Some(pid) => fetch_units(feed, pid),
                    None => BTreeMap::new(),
                };
                block.platform_ref_id = new_ref;
            }
        }
        if let Some(name) = patch.platform_name {
            block.platform_name = name;
        }
        if let Some(cost) = patch.unit_cost {
            block.unit_cost = cost;
        }
        if let Some(vol) = patch.total_volume_raw {
            block.total_volume_raw = vol;
        }
        self.recompute();
        Ok(())
    }

    pub fn remove_platform_block(&mut self, id: &str) -> Result<()> {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        if self.blocks.len() == before {
            return Err(AppError::not_found(format!("platform block '{}'", id)));
        }
        self.recompute();
        Ok(())
    }

    pub fn set_start_date(&mut self, start: Option<NaiveDate>) {
        self.start = start;
        self.window = start.and_then(ProjectWindow::new);
        if self.fixed_cost.mode == FixedCostMode::Auto {
            self.fixed_cost.monthly = self.auto_split(self.fixed_cost.annual_total);
        }
        self.recompute();
    }

    /// Auto mode: distribute `value` over the window by active days.
    pub fn set_fixed_cost_annual_total(&mut self, value: Decimal) -> Result<()> {
        check_amount("fixed cost", value)?;
        self.fixed_cost.mode = FixedCostMode::Auto;
        self.fixed_cost.annual_total = value;
        self.fixed_cost.monthly = self.auto_split(value);
        self.recompute();
        Ok(())
    }

    /// Manual mode: overriding one month freezes the whole distribution.
    pub fn set_fixed_cost_month(&mut self, month: YearMonth, value: Decimal) -> Result<()> {
        check_amount("fixed cost", value)?;
        match &self.window {
            Some(w) if w.contains(month) => {}
            Some(_) => {
                return Err(AppError::validation(format!(
                    "{} is outside the project window",
                    month
                )));
            }
            None => return Err(AppError::validation("project has no start date")),
        }
        self.fixed_cost.monthly.insert(month, value);
        self.fixed_cost.mode = FixedCostMode::Manual;
        self.fixed_cost.annual_total = saturating_sum(self.fixed_cost.monthly.values().copied());
        self.recompute();
        Ok(())
    }

    fn auto_split(&self, annual_total: Decimal) -> BTreeMap<YearMonth, Decimal> {
        let months = self.window.as_ref().map(|w| w.months()).unwrap_or(&[]);
        split_fixed_cost(annual_total, months, self.start)
    }

    /// Recompute every derived figure from the current inputs.
    pub fn recompute(&mut self) {
        let months: Vec<YearMonth> = self
            .window
            .as_ref()
            .map(|w| w.months().to_vec())
            .unwrap_or_default();

        let mut volume_annualized = Decimal::ZERO;
        let mut total_volume = Decimal::ZERO;
        let mut combined: BTreeMap<YearMonth, Decimal> = BTreeMap::new();

        for block in &mut self.blocks {
            let placeholder_units = if block.is_placeholder() && !months.is_empty() {
                Some(block.total_volume_raw / Decimal::from(months.len()))
            } else {
                None
            };

            let mut monthly_savings = BTreeMap::new();
            let mut annualized = Decimal::ZERO;
            let mut volume = Decimal::ZERO;
            for m in &months {
                let units = match placeholder_units {
                    Some(even) => even,
                    None => {
                        let raw = block.monthly_units.get(m).copied().unwrap_or(Decimal::ZERO);
                        prorate_units(raw, *m, self.start)
                    }
                };
                let savings = calculate_monthly_savings(units, block.unit_cost);
                monthly_savings.insert(*m, savings);
                add_to(combined.entry(*m).or_insert(Decimal::ZERO), savings);
                add_to(&mut annualized, savings);
                add_to(&mut volume, units);
            }

            block.monthly_savings = monthly_savings;
            block.annualized_savings = annualized;
            block.computed_volume = volume;
            add_to(&mut volume_annualized, annualized);
            add_to(&mut total_volume, volume);
        }

        let mut fixed_total = Decimal::ZERO;
        for (m, v) in &self.fixed_cost.monthly {
            add_to(combined.entry(*m).or_insert(Decimal::ZERO), *v);
            add_to(&mut fixed_total, *v);
        }

        let weighted_unit_cost = if total_volume > Decimal::ZERO {
            volume_annualized
                .checked_div(total_volume)
                .unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        };

        self.totals = Totals {
            weighted_unit_cost,
            annualized: volume_annualized.saturating_add(fixed_total),
            volume_annualized,
            total_volume,
            yearly: sum_by_year(&combined),
        };
    }

    /// Persistable / diffable form of the current state.
    pub fn snapshot(&self) -> FinancialSnapshot {
        FinancialSnapshot {
            platforms: self
                .blocks
                .iter()
                .map(|b| PlatformRow {
                    id: b.id.clone(),
                    platform_ref_id: b.platform_ref_id.clone(),
                    platform_name: b.platform_name.clone(),
                    unit_cost: b.unit_cost,
                    total_volume: if b.is_placeholder() {
                        b.total_volume_raw
                    } else {
                        b.computed_volume
                    },
                    annualized_savings: b.annualized_savings,
                })
                .collect(),
            fixed_cost: self
                .fixed_cost
                .monthly
                .iter()
                .map(|(m, v)| FixedCostEntry {
                    month: *m,
                    savings: *v,
                })
                .collect(),
        }
    }
}

fn add_to(total: &mut Decimal, value: Decimal) {
    *total = total.saturating_add(value);
}

fn fetch_units(feed: &dyn MonthlyUnitFeed, platform_id: &str) -> BTreeMap<YearMonth, Decimal> {
    match feed.monthly_units(platform_id) {
        Ok(units) => units,
        Err(e) => {
            log::warn!("Monthly units unavailable for platform {}: {}", platform_id, e);
            BTreeMap::new()
        }
    }
}
