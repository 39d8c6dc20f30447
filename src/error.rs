// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors raised by the library layer. Command handlers wrap these in `anyhow`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required input is missing or malformed. Raised before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A collaborator (platform directory, unit feed) could not be reached.
    /// The financial aggregate swallows this and treats the data as empty.
    #[error("external fetch failed: {0}")]
    ExternalFetch(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("change request {id} cannot move from {from} to {to}")]
    InvalidTransition { id: i64, from: String, to: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}
