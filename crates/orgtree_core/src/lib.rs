//! Core domain logic for orgtree.
//! Organizations own a tree of sectors; this crate keeps that tree consistent
//! in SQLite and rebuilds it for consumers.

pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig, TenantConfig};
pub use error::{CoreError, CoreResult, Entity};
pub use hierarchy::{build_tree, SectorTreeNode};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError,
};
pub use model::organization::{
    Organization, OrganizationDraft, OrganizationId, OrganizationStatus, OrganizationType,
};
pub use model::sector::{LabelMatch, NewSector, Sector, SectorDraft, SectorId, SectorStatus};
pub use model::TenantId;
pub use repo::organization_repo::{
    NewOrganization, OrganizationRepository, SqliteOrganizationRepository,
};
pub use repo::sector_repo::{SectorRepository, SqliteSectorRepository};
pub use repo::{StoreError, StoreResult};
pub use service::org_tree_service::{new_sector_code, OrgTreeService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
