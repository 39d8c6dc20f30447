// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, rendered and keyed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ => {
                if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() {
                    29
                } else {
                    28
                }
            }
        }
    }

    /// Short display label such as `Jan 2025`.
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(d) => d.format("%b %Y").to_string(),
            None => self.to_string(),
        }
    }

    /// Accepts `YYYY-MM` as well as anything starting with a date
    /// (`2025-01-14`, `2025-01-14T00:00:00.000Z`).
    pub fn parse_loose(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() < 7 || !s.is_char_boundary(7) {
            return None;
        }
        s[..7].parse().ok()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        if y.len() != 4 || m.len() != 2 {
            return Err(format!("Invalid month '{}', expected YYYY-MM", s));
        }
        let year: i32 = y
            .parse()
            .map_err(|_| format!("Invalid year in '{}'", s))?;
        let month: u32 = m
            .parse()
            .map_err(|_| format!("Invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Invalid month number {}", month))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlatformCategory {
    Direct,
    Common,
}

impl PlatformCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformCategory::Direct => "DIRECT",
            PlatformCategory::Common => "COMMON",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformOption {
    pub platform_id: String,
    pub platform_name: String,
    pub category: PlatformCategory,
}

/// Persisted form of one volume-based savings block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRow {
    pub id: String,
    pub platform_ref_id: Option<String>,
    pub platform_name: Option<String>,
    pub unit_cost: Decimal,
    pub total_volume: Decimal,
    pub annualized_savings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCostEntry {
    pub month: YearMonth,
    pub savings: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FixedCostMode {
    Auto,
    Manual,
}

impl FixedCostMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixedCostMode::Auto => "AUTO",
            FixedCostMode::Manual => "MANUAL",
        }
    }
}

impl FromStr for FixedCostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Ok(FixedCostMode::Auto),
            "MANUAL" => Ok(FixedCostMode::Manual),
            other => Err(format!("Unknown fixed cost mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub platforms: Vec<PlatformRow>,
    pub fixed_cost: Vec<FixedCostEntry>,
}

/// A project as seen by the change-diff engine: free-form metadata plus
/// the financial picture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub financial: FinancialSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Metadata,
    Financial,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Metadata => write!(f, "Metadata"),
            Section::Financial => write!(f, "Financial"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub section: Section,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeStatus {
    Submitted,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Submitted => "SUBMITTED",
            ChangeStatus::Approved => "APPROVED",
            ChangeStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ChangeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(ChangeStatus::Submitted),
            "APPROVED" => Ok(ChangeStatus::Approved),
            "REJECTED" => Ok(ChangeStatus::Rejected),
            other => Err(format!("Unknown change request status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactTotals {
    pub annualized: Decimal,
    pub year1: Decimal,
    pub year2: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field_name: String,
    pub original_value: String,
    pub requested_value: String,
    pub annual_impact: Decimal,
    pub year1_impact: Decimal,
    pub year2_impact: Decimal,
    pub reason_code: Option<String>,
    pub comment_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub change_request_id: i64,
    pub project_id: String,
    pub project_desc: String,
    pub status: ChangeStatus,
    pub reason_code: Option<String>,
    pub comment_code: Option<String>,
    pub created_on: String,
    pub approved_on: Option<String>,
    pub impact: ImpactTotals,
    pub fields: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub project_ref: String,
    pub doc_type: String,
    pub file_name: String,
    pub uploaded_by: String,
    pub uploaded_on: String,
    pub blob_id: Option<String>,
}
