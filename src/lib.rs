// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod app;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod diff;
pub mod documents;
pub mod error;
pub mod feeds;
pub mod finance;
pub mod ids;
pub mod labels;
pub mod lookups;
pub mod models;
pub mod normalize;
pub mod projects;
pub mod registry;
pub mod session;
pub mod utils;
pub mod workflow;
