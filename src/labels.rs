// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reference-label resolution for lookup documents and project metadata.

use crate::diff::{ValueResolver, coerce};
use crate::error::Result;
use crate::feeds::PlatformDirectory;
use crate::ids::is_object_id;
use crate::lookups::{LookupDoc, Lookups};
use crate::registry::EntityKind;
use serde_json::Value;

pub const LABEL_SUFFIX: &str = "__label";

/// Find the document `raw` refers to: id match for 24-hex values, then a
/// label-field match, then a case-insensitive id match.
pub fn find_target<'d>(targets: &'d [LookupDoc], raw: &str) -> Option<&'d LookupDoc> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let by_id = is_object_id(raw)
        .then(|| targets.iter().find(|t| t.id == raw))
        .flatten();
    by_id
        .or_else(|| {
            targets
                .iter()
                .find(|t| t.text(t.kind.label_field()) == Some(raw))
        })
        .or_else(|| {
            is_object_id(raw)
                .then(|| targets.iter().find(|t| t.id.eq_ignore_ascii_case(raw)))
                .flatten()
        })
}

/// Label for a raw reference value, falling back to the raw value.
pub fn resolve_label(targets: &[LookupDoc], raw: &str) -> String {
    find_target(targets, raw)
        .map(LookupDoc::label)
        .unwrap_or_else(|| raw.to_string())
}

/// Add a `<field>__label` entry for every reference field of `kind`.
pub fn enrich(lookups: &Lookups<'_>, kind: EntityKind, docs: &mut [LookupDoc]) -> Result<()> {
    for rule in kind.references() {
        let targets = lookups.all(rule.target)?;
        for doc in docs.iter_mut() {
            let Some(raw) = doc.data.get(rule.local_field).map(coerce) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            let label = resolve_label(&targets, &raw);
            doc.data.insert(
                format!("{}{}", rule.local_field, LABEL_SUFFIX),
                Value::String(label),
            );
        }
    }
    Ok(())
}

/// Resolves project metadata values through the lookup registry for
/// change review. Unknown fields and unmatched values stay raw.
pub struct LookupResolver<'a> {
    lookups: Lookups<'a>,
    platforms: Option<&'a dyn PlatformDirectory>,
}

impl<'a> LookupResolver<'a> {
    pub fn new(lookups: Lookups<'a>) -> Self {
        Self {
            lookups,
            platforms: None,
        }
    }

    pub fn with_platforms(mut self, platforms: &'a dyn PlatformDirectory) -> Self {
        self.platforms = Some(platforms);
        self
    }

    fn lookup_label(&self, kind: EntityKind, raw: &str) -> String {
        match self.lookups.all(kind) {
            Ok(targets) => resolve_label(&targets, raw),
            Err(e) => {
                log::warn!("Could not resolve {} '{}': {}", kind, raw, e);
                raw.to_string()
            }
        }
    }

    fn platform_label(&self, raw: &str) -> String {
        let Some(dir) = self.platforms else {
            return raw.to_string();
        };
        match dir.platform_name(raw) {
            Ok(Some(name)) => name,
            Ok(None) => raw.to_string(),
            Err(e) => {
                log::warn!("Could not resolve platform '{}': {}", raw, e);
                raw.to_string()
            }
        }
    }
}

impl ValueResolver for LookupResolver<'_> {
    fn resolve(&self, field: &str, value: &Value) -> String {
        let raw = coerce(value);
        if raw.is_empty() {
            return raw;
        }
        if field == "platform_ref_id" || field == "platformRefId" {
            return self.platform_label(&raw);
        }
        match EntityKind::for_project_field(field) {
            Some(kind) => self.lookup_label(kind, &raw),
            None => raw,
        }
    }
}
