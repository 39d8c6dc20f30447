// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Savings projection engine: project window, proration, savings math and
//! the per-project financial aggregate.

pub mod aggregate;
pub mod limits;
pub mod proration;
pub mod savings;
pub mod window;

pub use aggregate::{FinancialAggregate, FixedCost, PlatformBlock, PlatformPatch, Totals};
pub use limits::{check_amount, check_quantity, max_amount};
pub use proration::{prorate_units, split_fixed_cost};
pub use savings::{calculate_monthly_savings, saturating_sum, sum_by_year};
pub use window::{ProjectWindow, generate_months, project_end};
