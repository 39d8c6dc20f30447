// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::window::{active_days, project_end};
use crate::models::YearMonth;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Day-weighted share of a monthly unit quantity for `month`.
pub fn prorate_units(raw_monthly_units: Decimal, month: YearMonth, start: Option<NaiveDate>) -> Decimal {
    let Some(start) = start else {
        return Decimal::ZERO;
    };
    if raw_monthly_units.is_zero() {
        return Decimal::ZERO;
    }
    let Some(end) = project_end(start) else {
        return Decimal::ZERO;
    };

    let dim = Decimal::from(month.days_in_month());
    if month == YearMonth::of(start) {
        let active = Decimal::from(month.days_in_month() - start.day() + 1);
        return raw_monthly_units.saturating_mul(active) / dim;
    }
    if month == YearMonth::of(end) {
        let active = Decimal::from(end.day());
        return raw_monthly_units.saturating_mul(active) / dim;
    }
    raw_monthly_units
}

/// Spread an annual amount over `months` in proportion to each month's
/// active days. The last month absorbs the rounding residue so the parts
/// always sum to `annual_total` exactly.
pub fn split_fixed_cost(
    annual_total: Decimal,
    months: &[YearMonth],
    start: Option<NaiveDate>,
) -> BTreeMap<YearMonth, Decimal> {
    let mut out = BTreeMap::new();
    if annual_total.is_zero() || months.is_empty() {
        return out;
    }
    let Some(start) = start else {
        return out;
    };
    let Some(end) = project_end(start) else {
        return out;
    };

    let total_days: u32 = months.iter().map(|m| active_days(*m, start, end)).sum();
    if total_days == 0 {
        return out;
    }
    let total_days = Decimal::from(total_days);

    let mut allocated = Decimal::ZERO;
    for (idx, m) in months.iter().enumerate() {
        let amount = if idx + 1 == months.len() {
            annual_total.saturating_sub(allocated)
        } else {
            annual_total.saturating_mul(Decimal::from(active_days(*m, start, end))) / total_days
        };
        allocated = allocated.saturating_add(amount);
        out.insert(*m, amount);
    }
    out
}
