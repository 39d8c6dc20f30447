// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Input bounds for the projection math. Units and unit costs within
//! [`max_amount`] multiply and sum over a window without leaving the range
//! of `Decimal`.

use crate::error::{AppError, Result};
use rust_decimal::Decimal;

pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

/// Any sign, bounded magnitude. Used for fixed-cost amounts.
pub fn check_amount(field: &str, value: Decimal) -> Result<Decimal> {
    if value.abs() > max_amount() {
        return Err(AppError::validation(format!(
            "{} {} is out of range (max {})",
            field,
            value,
            max_amount()
        )));
    }
    Ok(value)
}

/// Non-negative, bounded. Used for units, unit costs and volumes.
pub fn check_quantity(field: &str, value: Decimal) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{} cannot be negative (got {})",
            field, value
        )));
    }
    check_amount(field, value)
}
