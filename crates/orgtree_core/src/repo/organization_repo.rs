//! Organization store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist organization rows that scope one sector tree each.
//! - Answer the pre-flight existence checks used by the orchestrator.
//!
//! # Invariants
//! - `(tenant_id, code)` and `(tenant_id, label)` are unique at the storage
//!   layer; violations surface as `StoreError::Db`.

use crate::model::organization::{
    Organization, OrganizationId, OrganizationStatus, OrganizationType,
};
use crate::model::TenantId;
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, Row, Transaction};

const ORGANIZATION_SELECT_SQL: &str = "SELECT
    id,
    tenant_id,
    code,
    label,
    type,
    status
FROM organizations";

const ORGANIZATION_COLUMNS: &[&str] = &["id", "tenant_id", "code", "label", "type", "status"];

/// Insert payload for one organization row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    pub tenant_id: TenantId,
    pub code: String,
    pub label: String,
    pub kind: OrganizationType,
    pub status: OrganizationStatus,
}

/// Store interface for organization rows.
pub trait OrganizationRepository {
    /// Inserts one organization and returns its id.
    fn create(&self, organization: &NewOrganization) -> StoreResult<OrganizationId>;
    /// Inserts one organization inside a caller-owned transaction.
    fn create_in_tx(
        &self,
        tx: &Transaction<'_>,
        organization: &NewOrganization,
    ) -> StoreResult<OrganizationId>;
    /// Loads one organization by code.
    fn find_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Organization>>;
    /// Lists every organization of a tenant.
    fn find_all(&self, tenant_id: TenantId) -> StoreResult<Vec<Organization>>;
    /// Returns whether `code` is taken in the tenant.
    fn exists_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<bool>;
    /// Returns whether `label` is taken in the tenant.
    fn exists_by_label(&self, tenant_id: TenantId, label: &str) -> StoreResult<bool>;
    /// Replaces the label of one organization. Returns rows changed.
    fn rename(&self, tenant_id: TenantId, code: &str, label: &str) -> StoreResult<usize>;
    /// Removes one organization row inside a caller-owned transaction.
    fn delete_in_tx(
        &self,
        tx: &Transaction<'_>,
        tenant_id: TenantId,
        code: &str,
    ) -> StoreResult<usize>;
}

/// SQLite-backed organization store.
pub struct SqliteOrganizationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrganizationRepository<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_table_ready(conn, "organizations", ORGANIZATION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl OrganizationRepository for SqliteOrganizationRepository<'_> {
    fn create(&self, organization: &NewOrganization) -> StoreResult<OrganizationId> {
        insert_organization(self.conn, organization)
    }

    fn create_in_tx(
        &self,
        tx: &Transaction<'_>,
        organization: &NewOrganization,
    ) -> StoreResult<OrganizationId> {
        insert_organization(tx, organization)
    }

    fn find_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Organization>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE tenant_id = ?1
               AND code = ?2;"
        ))?;
        let mut rows = stmt.query(params![tenant_id, code])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_organization_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self, tenant_id: TenantId) -> StoreResult<Vec<Organization>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE tenant_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([tenant_id])?;
        let mut organizations = Vec::new();
        while let Some(row) = rows.next()? {
            organizations.push(parse_organization_row(row)?);
        }
        Ok(organizations)
    }

    fn exists_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM organizations
                WHERE tenant_id = ?1
                  AND code = ?2
            );",
            params![tenant_id, code],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn exists_by_label(&self, tenant_id: TenantId, label: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM organizations
                WHERE tenant_id = ?1
                  AND label = ?2
            );",
            params![tenant_id, label],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn rename(&self, tenant_id: TenantId, code: &str, label: &str) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE organizations
             SET label = ?3
             WHERE tenant_id = ?1
               AND code = ?2;",
            params![tenant_id, code, label],
        )?;
        Ok(changed)
    }

    fn delete_in_tx(
        &self,
        tx: &Transaction<'_>,
        tenant_id: TenantId,
        code: &str,
    ) -> StoreResult<usize> {
        let removed = tx.execute(
            "DELETE FROM organizations
             WHERE tenant_id = ?1
               AND code = ?2;",
            params![tenant_id, code],
        )?;
        Ok(removed)
    }
}

fn insert_organization(
    conn: &Connection,
    organization: &NewOrganization,
) -> StoreResult<OrganizationId> {
    conn.execute(
        "INSERT INTO organizations (
            tenant_id,
            code,
            label,
            type,
            status
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            organization.tenant_id,
            organization.code.as_str(),
            organization.label.as_str(),
            organization_type_to_db(organization.kind),
            organization_status_to_db(organization.status),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_organization_row(row: &Row<'_>) -> StoreResult<Organization> {
    let type_text: String = row.get("type")?;
    let kind = parse_organization_type(&type_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid organization type `{type_text}` in organizations.type"
        ))
    })?;

    let status_value: i64 = row.get("status")?;
    let status = parse_organization_status(status_value).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid organization status `{status_value}` in organizations.status"
        ))
    })?;

    Ok(Organization {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        code: row.get("code")?,
        label: row.get("label")?,
        kind,
        status,
    })
}

fn organization_type_to_db(kind: OrganizationType) -> &'static str {
    match kind {
        OrganizationType::Lxsi => "lxsi",
        OrganizationType::Bu => "bu",
        OrganizationType::Community => "community",
        OrganizationType::Enterprise => "enterprise",
    }
}

fn parse_organization_type(value: &str) -> Option<OrganizationType> {
    match value {
        "lxsi" => Some(OrganizationType::Lxsi),
        "bu" => Some(OrganizationType::Bu),
        "community" => Some(OrganizationType::Community),
        "enterprise" => Some(OrganizationType::Enterprise),
        _ => None,
    }
}

fn organization_status_to_db(status: OrganizationStatus) -> i64 {
    match status {
        OrganizationStatus::Draft => 0,
        OrganizationStatus::Active => 1,
        OrganizationStatus::Inactive => 2,
        OrganizationStatus::Deleted => 3,
    }
}

fn parse_organization_status(value: i64) -> Option<OrganizationStatus> {
    match value {
        0 => Some(OrganizationStatus::Draft),
        1 => Some(OrganizationStatus::Active),
        2 => Some(OrganizationStatus::Inactive),
        3 => Some(OrganizationStatus::Deleted),
        _ => None,
    }
}
