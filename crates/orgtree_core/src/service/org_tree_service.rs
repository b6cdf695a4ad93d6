//! Organization and sector tree use-case service.
//!
//! # Responsibility
//! - Be the only writer of organization and sector rows.
//! - Enforce tree invariants above the store layer and turn store reads into
//!   `NotFound`/`Conflict` errors.
//!
//! # Invariants
//! - An organization and its root sector are written in one transaction;
//!   either both rows exist afterwards or neither does.
//! - A new sector sits exactly one level below its parent.
//! - Sector labels are unique per tenant, checked before writes and backed by
//!   a storage constraint.
//! - Store failures are never swallowed.

use crate::db::with_transaction;
use crate::error::{CoreError, CoreResult, Entity};
use crate::hierarchy::{build_tree, SectorTreeNode};
use crate::model::organization::{Organization, OrganizationDraft, OrganizationId};
use crate::model::sector::{NewSector, Sector, SectorDraft, SectorId, SectorStatus};
use crate::model::TenantId;
use crate::repo::error::StoreError;
use crate::repo::organization_repo::{
    NewOrganization, OrganizationRepository, SqliteOrganizationRepository,
};
use crate::repo::sector_repo::{SectorRepository, SqliteSectorRepository};
use log::{info, warn};
use rusqlite::Connection;
use std::time::Instant;
use uuid::Uuid;

const MAX_TEXT_CHARS: usize = 50;

/// Default source of opaque sector codes.
pub fn new_sector_code() -> String {
    Uuid::new_v4().to_string()
}

/// Tree consistency orchestrator over one connection.
pub struct OrgTreeService<'conn, O, S>
where
    O: OrganizationRepository,
    S: SectorRepository,
{
    conn: &'conn Connection,
    organizations: O,
    sectors: S,
    code_source: fn() -> String,
}

impl<'conn>
    OrgTreeService<'conn, SqliteOrganizationRepository<'conn>, SqliteSectorRepository<'conn>>
{
    /// Creates the service with SQLite stores over a migrated connection.
    pub fn try_from_connection(conn: &'conn Connection) -> CoreResult<Self> {
        let organizations = SqliteOrganizationRepository::try_new(conn)?;
        let sectors = SqliteSectorRepository::try_new(conn)?;
        Ok(Self::new(conn, organizations, sectors))
    }
}

impl<'conn, O, S> OrgTreeService<'conn, O, S>
where
    O: OrganizationRepository,
    S: SectorRepository,
{
    /// Creates the service from store implementations sharing `conn`.
    ///
    /// `conn` must be the connection the stores read from, so that checks made
    /// inside a transaction see its uncommitted writes.
    pub fn new(conn: &'conn Connection, organizations: O, sectors: S) -> Self {
        Self {
            conn,
            organizations,
            sectors,
            code_source: new_sector_code,
        }
    }

    /// Replaces the generator used for new sector codes.
    pub fn with_code_source(mut self, code_source: fn() -> String) -> Self {
        self.code_source = code_source;
        self
    }

    /// Creates an organization and its root sector atomically.
    ///
    /// The root mirrors the organization's code and label, is active, has
    /// depth 0 and no parent.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank or over-long code/label.
    /// - `Conflict` when the code or label is taken in the tenant, or when
    ///   the root sector collides with an existing sector code/label.
    /// - `Persistence` for any other store failure. Nothing is written.
    pub fn create_organization_with_root(
        &self,
        tenant_id: TenantId,
        draft: &OrganizationDraft,
    ) -> CoreResult<OrganizationId> {
        let started_at = Instant::now();
        let result = self.create_organization_with_root_inner(tenant_id, draft);
        log_outcome("org_create", started_at, &result);
        result
    }

    fn create_organization_with_root_inner(
        &self,
        tenant_id: TenantId,
        draft: &OrganizationDraft,
    ) -> CoreResult<OrganizationId> {
        let code = normalize_text("code", &draft.code)?;
        let label = normalize_text("label", &draft.label)?;

        with_transaction::<_, CoreError, _>(self.conn, "org_create", |tx| {
            if self.organizations.exists_by_code(tenant_id, &code)? {
                return Err(CoreError::conflict(Entity::Organization, "code", code.as_str()));
            }
            if self.organizations.exists_by_label(tenant_id, &label)? {
                return Err(CoreError::conflict(
                    Entity::Organization,
                    "label",
                    label.as_str(),
                ));
            }

            let organization = NewOrganization {
                tenant_id,
                code: code.clone(),
                label: label.clone(),
                kind: draft.kind,
                status: draft.status,
            };
            let org_id = self
                .organizations
                .create_in_tx(tx, &organization)
                .map_err(|err| classify_write_error(err, Entity::Organization, &code, &label))?;

            let root = NewSector::root(tenant_id, org_id, code.as_str(), label.as_str());
            self.sectors
                .create_in_tx(tx, &root)
                .map_err(|err| classify_write_error(err, Entity::RootSector, &code, &label))?;

            Ok(org_id)
        })
    }

    /// Creates a sector below `parent_code`, or below the organization's root
    /// when no parent code is given.
    ///
    /// # Errors
    /// - `Conflict` when `label` is already used by a sector of the tenant.
    /// - `NotFound` when the parent (or the root) is missing in this
    ///   organization.
    pub fn create_sector(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
        label: &str,
        parent_code: Option<&str>,
    ) -> CoreResult<SectorId> {
        let started_at = Instant::now();
        let result =
            self.create_sector_inner(tenant_id, org_id, label, parent_code, SectorStatus::Active);
        log_outcome("sector_create", started_at, &result);
        result
    }

    /// Creates a sector in the organization identified by `org_code` and
    /// returns the stored record.
    pub fn create_sector_in_organization(
        &self,
        tenant_id: TenantId,
        org_code: &str,
        draft: &SectorDraft,
    ) -> CoreResult<Sector> {
        let started_at = Instant::now();
        let result = self
            .find_organization(tenant_id, org_code)
            .and_then(|organization| {
                self.create_sector_inner(
                    tenant_id,
                    organization.id,
                    &draft.label,
                    draft.parent_code.as_deref(),
                    draft.status,
                )
            })
            .and_then(|id| self.find_sector(tenant_id, id));
        log_outcome("sector_create", started_at, &result);
        result
    }

    fn create_sector_inner(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
        label: &str,
        parent_code: Option<&str>,
        status: SectorStatus,
    ) -> CoreResult<SectorId> {
        let label = normalize_text("label", label)?;
        if self.sectors.find_by_label(tenant_id, &label)?.is_some() {
            return Err(CoreError::conflict(Entity::Sector, "label", label));
        }

        let parent = self.resolve_parent(tenant_id, org_id, parent_code)?;
        let code = (self.code_source)();
        let sector = NewSector::child_of(&parent, code.as_str(), label.as_str(), status);
        self.sectors
            .create(&sector)
            .map_err(|err| classify_write_error(err, Entity::Sector, &code, &label))
    }

    fn resolve_parent(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
        parent_code: Option<&str>,
    ) -> CoreResult<Sector> {
        match parent_code.map(str::trim).filter(|code| !code.is_empty()) {
            Some(code) => self
                .sectors
                .find_by_code(tenant_id, code)?
                .filter(|parent| parent.org_id == org_id)
                .ok_or_else(|| CoreError::not_found(Entity::ParentSector, code)),
            None => self
                .sectors
                .find_root(tenant_id, org_id)?
                .ok_or_else(|| CoreError::not_found(Entity::RootSector, org_id)),
        }
    }

    /// Renames one sector.
    ///
    /// # Errors
    /// - `NotFound` when the sector does not exist.
    /// - `Conflict` when another sector already owns `label`.
    pub fn rename_sector(&self, tenant_id: TenantId, id: SectorId, label: &str) -> CoreResult<()> {
        let started_at = Instant::now();
        let result = self.rename_sector_inner(tenant_id, id, label);
        log_outcome("sector_rename", started_at, &result);
        result
    }

    fn rename_sector_inner(
        &self,
        tenant_id: TenantId,
        id: SectorId,
        label: &str,
    ) -> CoreResult<()> {
        let label = normalize_text("label", label)?;
        let sector = self.find_sector(tenant_id, id)?;

        if let Some(owner) = self.sectors.find_by_label(tenant_id, &label)? {
            if owner.code != sector.code {
                return Err(CoreError::conflict(Entity::Sector, "label", label));
            }
        }

        let changed = self
            .sectors
            .rename(tenant_id, id, &label)
            .map_err(|err| classify_write_error(err, Entity::Sector, &sector.code, &label))?;
        if changed == 0 {
            return Err(CoreError::not_found(Entity::Sector, id));
        }
        Ok(())
    }

    /// Deletes one sector and its direct children.
    ///
    /// Deeper descendants are kept and point at the removed row. Returns the
    /// number of rows removed.
    pub fn delete_sector(&self, tenant_id: TenantId, id: SectorId) -> CoreResult<usize> {
        let started_at = Instant::now();
        let result = self
            .find_sector(tenant_id, id)
            .and_then(|_| Ok(self.sectors.delete(tenant_id, id)?));
        log_outcome("sector_delete", started_at, &result);
        result
    }

    /// Loads one sector by id.
    pub fn find_sector(&self, tenant_id: TenantId, id: SectorId) -> CoreResult<Sector> {
        self.sectors
            .find_by_id(tenant_id, id)?
            .ok_or_else(|| CoreError::not_found(Entity::Sector, id))
    }

    /// Loads one sector by external code.
    pub fn find_sector_by_code(&self, tenant_id: TenantId, code: &str) -> CoreResult<Sector> {
        self.sectors
            .find_by_code(tenant_id, code)?
            .ok_or_else(|| CoreError::not_found(Entity::Sector, code))
    }

    /// Loads the root sector of an organization.
    pub fn find_root_sector(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
    ) -> CoreResult<Sector> {
        self.sectors
            .find_root(tenant_id, org_id)?
            .ok_or_else(|| CoreError::not_found(Entity::RootSector, org_id))
    }

    /// Lists the flat sector rows of an organization.
    pub fn list_sectors(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
    ) -> CoreResult<Vec<Sector>> {
        Ok(self.sectors.find_all_for_org(tenant_id, org_id)?)
    }

    /// Reconstructs the sector tree of the organization `org_code`.
    pub fn sector_tree(&self, tenant_id: TenantId, org_code: &str) -> CoreResult<SectorTreeNode> {
        let organization = self.find_organization(tenant_id, org_code)?;
        let sectors = self.sectors.find_all_for_org(tenant_id, organization.id)?;
        build_tree(&sectors)
    }

    /// Loads one organization by code.
    pub fn find_organization(&self, tenant_id: TenantId, code: &str) -> CoreResult<Organization> {
        self.organizations
            .find_by_code(tenant_id, code)?
            .ok_or_else(|| CoreError::not_found(Entity::Organization, code))
    }

    /// Lists the organizations of a tenant.
    pub fn list_organizations(&self, tenant_id: TenantId) -> CoreResult<Vec<Organization>> {
        Ok(self.organizations.find_all(tenant_id)?)
    }

    /// Renames an organization. The root sector keeps its label.
    ///
    /// # Errors
    /// - `NotFound` when the organization does not exist.
    /// - `Conflict` when another organization of the tenant owns `label`.
    pub fn rename_organization(
        &self,
        tenant_id: TenantId,
        code: &str,
        label: &str,
    ) -> CoreResult<()> {
        let started_at = Instant::now();
        let result = self.rename_organization_inner(tenant_id, code, label);
        log_outcome("org_rename", started_at, &result);
        result
    }

    fn rename_organization_inner(
        &self,
        tenant_id: TenantId,
        code: &str,
        label: &str,
    ) -> CoreResult<()> {
        let label = normalize_text("label", label)?;
        let organization = self.find_organization(tenant_id, code)?;
        if organization.label == label {
            return Ok(());
        }
        if self.organizations.exists_by_label(tenant_id, &label)? {
            return Err(CoreError::conflict(Entity::Organization, "label", label));
        }

        let changed = self
            .organizations
            .rename(tenant_id, code, &label)
            .map_err(|err| classify_write_error(err, Entity::Organization, code, &label))?;
        if changed == 0 {
            return Err(CoreError::not_found(Entity::Organization, code));
        }
        Ok(())
    }

    /// Deletes an organization together with every sector it owns.
    pub fn delete_organization(&self, tenant_id: TenantId, code: &str) -> CoreResult<()> {
        let started_at = Instant::now();
        let result = self.find_organization(tenant_id, code).and_then(|organization| {
            with_transaction::<_, CoreError, _>(self.conn, "org_delete", |tx| {
                self.sectors.delete_all_for_org_in_tx(tx, organization.id)?;
                self.organizations.delete_in_tx(tx, tenant_id, code)?;
                Ok(())
            })
        });
        log_outcome("org_delete", started_at, &result);
        result
    }
}

fn normalize_text(field: &'static str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput {
            field,
            reason: "must not be blank",
        });
    }
    if trimmed.chars().count() > MAX_TEXT_CHARS {
        return Err(CoreError::InvalidInput {
            field,
            reason: "must be at most 50 characters",
        });
    }
    Ok(trimmed.to_string())
}

/// Turns a unique-constraint failure on insert/update into `Conflict`.
fn classify_write_error(err: StoreError, entity: Entity, code: &str, label: &str) -> CoreError {
    match err.unique_violation_detail() {
        Some(detail) if detail.contains(".label") => CoreError::conflict(entity, "label", label),
        Some(_) => CoreError::conflict(entity, "code", code),
        None => CoreError::Persistence(err),
    }
}

fn log_outcome<T>(event: &str, started_at: Instant, result: &CoreResult<T>) {
    match result {
        Ok(_) => info!(
            "event={} module=service status=ok duration_ms={}",
            event,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=service status=error duration_ms={} error_code={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, MAX_TEXT_CHARS};
    use crate::error::CoreError;

    #[test]
    fn normalize_text_trims_and_rejects_blank() {
        assert_eq!(normalize_text("label", "  north ").unwrap(), "north");
        let err = normalize_text("label", "   ").unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { field: "label", .. }));
    }

    #[test]
    fn normalize_text_limits_length_in_chars() {
        let exact = "é".repeat(MAX_TEXT_CHARS);
        assert!(normalize_text("code", &exact).is_ok());
        let err = normalize_text("code", &format!("{exact}x")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { field: "code", .. }));
    }
}
