// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::YearMonth;
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// Last active day of a project: one calendar year after `start`, minus a day.
pub fn project_end(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(12))?.pred_opt()
}

/// The 12 or 13 calendar months a project's year touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectWindow {
    start: NaiveDate,
    end: NaiveDate,
    months: Vec<YearMonth>,
}

impl ProjectWindow {
    pub fn new(start: NaiveDate) -> Option<Self> {
        let end = project_end(start)?;
        let last = YearMonth::of(end);
        let mut months = Vec::with_capacity(13);
        let mut cursor = YearMonth::of(start);
        while cursor <= last {
            months.push(cursor);
            cursor = cursor.next();
        }
        Some(Self { start, end, months })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn months(&self) -> &[YearMonth] {
        &self.months
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.months.binary_search(&month).is_ok()
    }

    /// Days of `month` inside the project: partial for the first and last
    /// month, the full month otherwise.
    pub fn active_days(&self, month: YearMonth) -> u32 {
        active_days(month, self.start, self.end)
    }
}

pub(crate) fn active_days(month: YearMonth, start: NaiveDate, end: NaiveDate) -> u32 {
    let dim = month.days_in_month();
    if month == YearMonth::of(start) {
        dim - start.day() + 1
    } else if month == YearMonth::of(end) {
        end.day()
    } else {
        dim
    }
}

/// Months of the project window; empty when there is no usable start date.
pub fn generate_months(start: Option<NaiveDate>) -> Vec<YearMonth> {
    start
        .and_then(ProjectWindow::new)
        .map(|w| w.months)
        .unwrap_or_default()
}
