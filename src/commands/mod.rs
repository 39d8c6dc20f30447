// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod changes;
pub mod config;
pub mod doctor;
pub mod documents;
pub mod exporter;
pub mod financial;
pub mod importer;
pub mod lookups;
pub mod platforms;
pub mod projects;
