// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::YearMonth;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// `units × unit_cost`, saturating at the bounds of `Decimal`.
pub fn calculate_monthly_savings(units: Decimal, unit_cost: Decimal) -> Decimal {
    if units.is_zero() || unit_cost.is_zero() {
        return Decimal::ZERO;
    }
    units.saturating_mul(unit_cost)
}

/// Sum without overflow panics.
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Group a monthly series by calendar year and sum it.
pub fn sum_by_year<'a, I>(series: I) -> BTreeMap<i32, Decimal>
where
    I: IntoIterator<Item = (&'a YearMonth, &'a Decimal)>,
{
    let mut yearly = BTreeMap::new();
    for (month, value) in series {
        let total = yearly.entry(month.year()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(*value);
    }
    yearly
}
