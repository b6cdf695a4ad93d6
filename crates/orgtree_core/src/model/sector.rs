//! Sector domain model.
//!
//! # Responsibility
//! - Describe one node of an organization's sector tree as stored flat.
//! - Provide constructors that set depth/parent fields consistently.
//!
//! # Invariants
//! - Root: `has_parent == false`, `parent_id == None`, `depth == 0`.
//! - Non-root: `has_parent == true`, `parent_id == Some(p)`,
//!   `depth == depth(p) + 1`.

use crate::model::organization::OrganizationId;
use crate::model::TenantId;
use serde::{Deserialize, Serialize};

/// Database identifier of a sector row.
pub type SectorId = i64;

/// Sector lifecycle state. Persisted as `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorStatus {
    Draft,
    #[default]
    Active,
    Inactive,
    Deleted,
}

/// Persisted sector record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub tenant_id: TenantId,
    pub org_id: OrganizationId,
    /// Opaque external identifier, globally unique.
    pub code: String,
    /// Unique within the tenant.
    pub label: String,
    /// `None` only for the root sector.
    pub parent_id: Option<SectorId>,
    /// Redundant with `parent_id.is_some()`, kept as an explicit column.
    pub has_parent: bool,
    pub depth: u32,
    pub status: SectorStatus,
}

impl Sector {
    /// Returns whether this sector is the root of its organization's tree.
    pub fn is_root(&self) -> bool {
        !self.has_parent && self.depth == 0
    }
}

/// Insert payload for one sector row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSector {
    pub tenant_id: TenantId,
    pub org_id: OrganizationId,
    pub code: String,
    pub label: String,
    pub parent_id: Option<SectorId>,
    pub has_parent: bool,
    pub depth: u32,
    pub status: SectorStatus,
}

impl NewSector {
    /// Builds the root sector of an organization.
    pub fn root(
        tenant_id: TenantId,
        org_id: OrganizationId,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            org_id,
            code: code.into(),
            label: label.into(),
            parent_id: None,
            has_parent: false,
            depth: 0,
            status: SectorStatus::Active,
        }
    }

    /// Builds a sector one level below `parent`, in the parent's tenant and
    /// organization.
    pub fn child_of(
        parent: &Sector,
        code: impl Into<String>,
        label: impl Into<String>,
        status: SectorStatus,
    ) -> Self {
        Self {
            tenant_id: parent.tenant_id,
            org_id: parent.org_id,
            code: code.into(),
            label: label.into(),
            parent_id: Some(parent.id),
            has_parent: true,
            depth: parent.depth + 1,
            status,
        }
    }
}

/// Caller input for creating a non-root sector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorDraft {
    pub label: String,
    /// Parent sector code. `None` attaches the sector under the root.
    #[serde(default, rename = "parentCode")]
    pub parent_code: Option<String>,
    #[serde(default)]
    pub status: SectorStatus,
}

impl SectorDraft {
    /// Creates an active draft with an optional parent code.
    pub fn new(label: impl Into<String>, parent_code: Option<&str>) -> Self {
        Self {
            label: label.into(),
            parent_code: parent_code.map(str::to_string),
            status: SectorStatus::Active,
        }
    }
}

/// Result of a label lookup, used for uniqueness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatch {
    pub id: SectorId,
    pub code: String,
}
