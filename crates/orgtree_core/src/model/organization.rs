//! Organization domain model.
//!
//! # Invariants
//! - `code` and `label` are unique within one tenant.
//! - The organization's root sector mirrors its `code` and `label`.

use crate::model::TenantId;
use serde::{Deserialize, Serialize};

/// Database identifier of an organization row.
pub type OrganizationId = i64;

/// Organization category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    Lxsi,
    Bu,
    Community,
    Enterprise,
}

/// Organization lifecycle state. Persisted as `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    Draft,
    #[default]
    Active,
    Inactive,
    Deleted,
}

/// Persisted organization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub tenant_id: TenantId,
    /// Opaque external identifier.
    pub code: String,
    pub label: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: OrganizationType,
    pub status: OrganizationStatus,
}

/// Caller input for creating an organization together with its root sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDraft {
    pub code: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: OrganizationType,
    #[serde(default)]
    pub status: OrganizationStatus,
}

impl OrganizationDraft {
    /// Creates an active draft.
    pub fn new(code: impl Into<String>, label: impl Into<String>, kind: OrganizationType) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            kind,
            status: OrganizationStatus::Active,
        }
    }
}
