// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed registry of lookup entity kinds and their storage rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Brand,
    Commodity,
    Subcommodity,
    Idco,
    Location,
    OpsGroup,
    OpsMode,
    OpsSubMode,
    FunctionalGroup,
    Supplier,
    ProjectStatus,
    ActivityType,
    User,
}

/// Audit field names a kind stores in its documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditFields {
    pub created_by: &'static str,
    pub created_on: &'static str,
    pub modified_by: &'static str,
    pub modified_on: &'static str,
}

const DEFAULT_AUDIT: AuditFields = AuditFields {
    created_by: "createdBy",
    created_on: "createdOn",
    modified_by: "modifiedBy",
    modified_on: "modifiedOn",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Flip the status field to INACTIVE.
    Soft,
    /// Remove the row.
    Hard,
}

/// A field of one kind that stores a reference to another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRule {
    pub local_field: &'static str,
    pub target: EntityKind,
}

const SUBCOMMODITY_REFS: &[ReferenceRule] = &[
    ReferenceRule {
        local_field: "commodityName",
        target: EntityKind::Commodity,
    },
    ReferenceRule {
        local_field: "opsGroupNameRef",
        target: EntityKind::OpsGroup,
    },
];

const IDCO_REFS: &[ReferenceRule] = &[ReferenceRule {
    local_field: "subcommodity_ref",
    target: EntityKind::Subcommodity,
}];

const OPS_GROUP_REFS: &[ReferenceRule] = &[ReferenceRule {
    local_field: "opsGroupNameRef",
    target: EntityKind::OpsGroup,
}];

const LOCATION_REFS: &[ReferenceRule] = &[
    ReferenceRule {
        local_field: "opsGrp",
        target: EntityKind::OpsGroup,
    },
    ReferenceRule {
        local_field: "functionalGroup",
        target: EntityKind::FunctionalGroup,
    },
];

pub const ALL_KINDS: [EntityKind; 13] = [
    EntityKind::Brand,
    EntityKind::Commodity,
    EntityKind::Subcommodity,
    EntityKind::Idco,
    EntityKind::Location,
    EntityKind::OpsGroup,
    EntityKind::OpsMode,
    EntityKind::OpsSubMode,
    EntityKind::FunctionalGroup,
    EntityKind::Supplier,
    EntityKind::ProjectStatus,
    EntityKind::ActivityType,
    EntityKind::User,
];

impl EntityKind {
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Brand => "brand",
            EntityKind::Commodity => "commodity",
            EntityKind::Subcommodity => "subcommodity",
            EntityKind::Idco => "idco",
            EntityKind::Location => "locations",
            EntityKind::OpsGroup => "opsGroup",
            EntityKind::OpsMode => "opsMode",
            EntityKind::OpsSubMode => "opsSubMode",
            EntityKind::FunctionalGroup => "functionalGroup",
            EntityKind::Supplier => "supplier",
            EntityKind::ProjectStatus => "projectStatus",
            EntityKind::ActivityType => "activityType",
            EntityKind::User => "usersClean",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EntityKind::Brand => "Brand",
            EntityKind::Commodity => "Commodity",
            EntityKind::Subcommodity => "Subcommodities",
            EntityKind::Idco => "IDCO",
            EntityKind::Location => "Locations",
            EntityKind::OpsGroup => "Ops Group",
            EntityKind::OpsMode => "Ops Mode",
            EntityKind::OpsSubMode => "Ops Sub Mode",
            EntityKind::FunctionalGroup => "Functional Group",
            EntityKind::Supplier => "Supplier",
            EntityKind::ProjectStatus => "Project Status",
            EntityKind::ActivityType => "Activity Type",
            EntityKind::User => "Users",
        }
    }

    /// Field holding the human-readable name.
    pub fn label_field(self) -> &'static str {
        match self {
            EntityKind::Brand => "brandName",
            EntityKind::Commodity => "name",
            EntityKind::Subcommodity => "subcommodityName",
            EntityKind::Idco => "idcoTableName",
            EntityKind::Location => "locationName",
            EntityKind::OpsGroup => "opsGroupName",
            EntityKind::OpsMode => "opsModeName",
            EntityKind::OpsSubMode => "opsSubModeName",
            EntityKind::FunctionalGroup => "functionalGroupName",
            EntityKind::Supplier => "supplierName",
            EntityKind::ProjectStatus => "projectStatusName",
            EntityKind::ActivityType => "name",
            EntityKind::User => "firstName",
        }
    }

    pub fn status_field(self) -> &'static str {
        match self {
            EntityKind::Brand => "brandStatus",
            EntityKind::Subcommodity => "subcommodityStatus",
            EntityKind::Idco => "idcoTableStatus",
            _ => "status",
        }
    }

    pub fn audit_fields(self) -> AuditFields {
        match self {
            EntityKind::Brand => AuditFields {
                created_by: "brandCreatedBy",
                modified_by: "brandModifiedBy",
                ..DEFAULT_AUDIT
            },
            EntityKind::Commodity => AuditFields {
                created_by: "commodityCreatedBy",
                modified_by: "commodityModifiedBy",
                ..DEFAULT_AUDIT
            },
            _ => DEFAULT_AUDIT,
        }
    }

    pub fn delete_policy(self) -> DeletePolicy {
        match self {
            EntityKind::Idco | EntityKind::OpsSubMode => DeletePolicy::Hard,
            _ => DeletePolicy::Soft,
        }
    }

    pub fn references(self) -> &'static [ReferenceRule] {
        match self {
            EntityKind::Subcommodity => SUBCOMMODITY_REFS,
            EntityKind::Idco => IDCO_REFS,
            EntityKind::OpsMode | EntityKind::OpsSubMode => OPS_GROUP_REFS,
            EntityKind::Location => LOCATION_REFS,
            _ => &[],
        }
    }

    /// Lookup kind referenced by a project metadata field, if any.
    pub fn for_project_field(field: &str) -> Option<EntityKind> {
        match field {
            "brand" => Some(EntityKind::Brand),
            "commodity" => Some(EntityKind::Commodity),
            "subCommodity" | "subcommodity" => Some(EntityKind::Subcommodity),
            "idco" => Some(EntityKind::Idco),
            "location" => Some(EntityKind::Location),
            "operationsGroup" => Some(EntityKind::OpsGroup),
            "operationsMode" | "conversionMode" => Some(EntityKind::OpsMode),
            "operationsSubMode" => Some(EntityKind::OpsSubMode),
            "functionGroup" => Some(EntityKind::FunctionalGroup),
            "supplier" => Some(EntityKind::Supplier),
            "risk" => Some(EntityKind::ProjectStatus),
            "activityType" => Some(EntityKind::ActivityType),
            "projectOwner" | "purchasingAgent" => Some(EntityKind::User),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL_KINDS
            .iter()
            .copied()
            .find(|k| k.collection().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown lookup '{}'", wanted))
    }
}
