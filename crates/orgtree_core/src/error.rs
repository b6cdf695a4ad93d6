//! Domain error taxonomy for tree operations.
//!
//! # Invariants
//! - The set of variants is closed; callers match structurally.
//! - `Persistence` wraps store failures unchanged.

use crate::repo::error::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Entity kind referenced by `NotFound`/`Conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Organization,
    Sector,
    ParentSector,
    RootSector,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Organization => "organization",
            Self::Sector => "sector",
            Self::ParentSector => "parent sector",
            Self::RootSector => "root sector",
        };
        f.write_str(name)
    }
}

/// Errors returned by the tree orchestration service and reconstruction.
#[derive(Debug)]
pub enum CoreError {
    /// Referenced organization, sector, parent or root does not exist.
    NotFound { entity: Entity, key: String },
    /// Duplicate code or label within a tenant.
    Conflict {
        entity: Entity,
        field: &'static str,
        value: String,
    },
    /// Reconstruction input has no depth-0 sector.
    RootNotFound,
    /// Caller-supplied code or label is unusable.
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },
    /// Store failure not otherwise classified.
    Persistence(StoreError),
}

impl CoreError {
    pub(crate) fn not_found(entity: Entity, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn conflict(entity: Entity, field: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Suggested HTTP status for outer transport layers.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::InvalidInput { .. } => 400,
            Self::RootNotFound | Self::Persistence(_) => 500,
        }
    }

    /// Stable machine-readable code for logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound {
                entity: Entity::Organization,
                ..
            } => "org_not_found",
            Self::NotFound { .. } => "sector_not_found",
            Self::Conflict {
                entity: Entity::Organization,
                ..
            } => "org_already_exists",
            Self::Conflict { .. } => "sector_already_exists",
            Self::RootNotFound => "sector_root_not_found",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Persistence(_) => "persistence_failure",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Conflict {
                entity,
                field,
                value,
            } => write!(f, "{entity} already exists with {field} `{value}`"),
            Self::RootNotFound => write!(f, "sector set has no root (depth 0) sector"),
            Self::InvalidInput { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(StoreError::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreError, Entity};
    use crate::repo::error::StoreError;

    #[test]
    fn http_status_follows_error_kind() {
        assert_eq!(CoreError::not_found(Entity::Sector, 7).http_status(), 404);
        assert_eq!(
            CoreError::conflict(Entity::Organization, "code", "acme").http_status(),
            409
        );
        assert_eq!(CoreError::RootNotFound.http_status(), 500);
        assert_eq!(
            CoreError::Persistence(StoreError::InvalidData("x".to_string())).http_status(),
            500
        );
    }

    #[test]
    fn display_names_entity_and_key() {
        let err = CoreError::conflict(Entity::Sector, "label", "north");
        assert_eq!(err.to_string(), "sector already exists with label `north`");
        assert_eq!(err.code(), "sector_already_exists");

        let err = CoreError::not_found(Entity::ParentSector, "missing");
        assert_eq!(err.to_string(), "parent sector not found: missing");
    }
}
