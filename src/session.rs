// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::diff::{PlatformChangeStrategy, ValueResolver, compute_changes_with};
use crate::error::Result;
use crate::feeds::MonthlyUnitFeed;
use crate::finance::{FinancialAggregate, PlatformPatch};
use crate::models::{ChangeRecord, ImpactTotals, Snapshot, YearMonth};
use crate::projects::CanonicalProject;
use crate::workflow::impact_from_totals;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// One editing pass over a project: a frozen baseline plus a draft that
/// recomputes on every edit.
pub struct EditSession<'a> {
    project: CanonicalProject,
    baseline: Snapshot,
    metadata: Map<String, Value>,
    aggregate: FinancialAggregate,
    feed: &'a dyn MonthlyUnitFeed,
}

impl<'a> EditSession<'a> {
    pub fn open(project: CanonicalProject, feed: &'a dyn MonthlyUnitFeed) -> Self {
        let aggregate = project.aggregate(feed);
        let baseline = project.snapshot(&aggregate);
        Self {
            metadata: project.metadata.clone(),
            project,
            baseline,
            aggregate,
            feed,
        }
    }

    pub fn project(&self) -> &CanonicalProject {
        &self.project
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    pub fn aggregate(&self) -> &FinancialAggregate {
        &self.aggregate
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn draft(&self) -> Snapshot {
        Snapshot {
            metadata: self.metadata.clone(),
            financial: self.aggregate.snapshot(),
        }
    }

    pub fn set_field(&mut self, key: &str, value: Value) {
        self.metadata.insert(key.to_string(), value);
    }

    /// Moves the project window; the metadata `startDate` follows.
    pub fn set_start_date(&mut self, start: Option<NaiveDate>) {
        self.aggregate.set_start_date(start);
        let v = start
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null);
        self.metadata.insert("startDate".into(), v);
    }

    pub fn add_platform_block(&mut self) -> String {
        self.aggregate.add_platform_block()
    }

    pub fn update_platform_block(&mut self, id: &str, patch: PlatformPatch) -> Result<()> {
        self.aggregate.update_platform_block(id, patch, self.feed)
    }

    pub fn remove_platform_block(&mut self, id: &str) -> Result<()> {
        self.aggregate.remove_platform_block(id)
    }

    pub fn set_fixed_cost_annual_total(&mut self, value: Decimal) -> Result<()> {
        self.aggregate.set_fixed_cost_annual_total(value)
    }

    pub fn set_fixed_cost_month(&mut self, month: YearMonth, value: Decimal) -> Result<()> {
        self.aggregate.set_fixed_cost_month(month, value)
    }

    pub fn review(
        &self,
        resolver: &dyn ValueResolver,
        strategy: &dyn PlatformChangeStrategy,
    ) -> Result<Vec<ChangeRecord>> {
        compute_changes_with(&self.baseline, &self.draft(), resolver, strategy)
    }

    pub fn impact(&self, today: NaiveDate) -> ImpactTotals {
        impact_from_totals(self.aggregate.totals(), today)
    }
}
