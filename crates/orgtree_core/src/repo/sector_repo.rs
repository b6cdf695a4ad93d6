//! Sector store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist sector rows of the flat tree table.
//! - Provide the lookups the orchestrator needs to keep tree invariants.
//!
//! # Invariants
//! - Every query except `delete_all_for_org*` filters by `tenant_id`.
//! - `delete` is shallow: it removes the target and rows whose `parent_id`
//!   is the target, nothing deeper.
//! - `find_all_for_org` makes no ordering promise beyond `id ASC`.

use crate::model::organization::OrganizationId;
use crate::model::sector::{LabelMatch, NewSector, Sector, SectorId, SectorStatus};
use crate::model::TenantId;
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::schema::{bool_to_int, ensure_table_ready, parse_flag};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

const SECTOR_SELECT_SQL: &str = "SELECT
    id,
    tenant_id,
    org_id,
    code,
    label,
    parent_id,
    has_parent,
    depth,
    status
FROM sectors";

const SECTOR_COLUMNS: &[&str] = &[
    "id",
    "tenant_id",
    "org_id",
    "code",
    "label",
    "parent_id",
    "has_parent",
    "depth",
    "status",
];

/// Store interface for sector rows.
pub trait SectorRepository {
    /// Inserts one sector and returns its id.
    fn create(&self, sector: &NewSector) -> StoreResult<SectorId>;
    /// Inserts one sector inside a caller-owned transaction.
    fn create_in_tx(&self, tx: &Transaction<'_>, sector: &NewSector) -> StoreResult<SectorId>;
    /// Loads one sector by external code.
    fn find_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Sector>>;
    /// Loads one sector by id.
    fn find_by_id(&self, tenant_id: TenantId, id: SectorId) -> StoreResult<Option<Sector>>;
    /// Finds the sector owning `label` in the tenant, if any.
    fn find_by_label(&self, tenant_id: TenantId, label: &str) -> StoreResult<Option<LabelMatch>>;
    /// Loads the parent-less sector of an organization.
    fn find_root(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
    ) -> StoreResult<Option<Sector>>;
    /// Loads every sector of an organization.
    fn find_all_for_org(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
    ) -> StoreResult<Vec<Sector>>;
    /// Replaces the label of one sector. Returns the number of rows changed.
    fn rename(&self, tenant_id: TenantId, id: SectorId, label: &str) -> StoreResult<usize>;
    /// Removes one sector and its direct children. Returns rows removed.
    fn delete(&self, tenant_id: TenantId, id: SectorId) -> StoreResult<usize>;
    /// Removes every sector of an organization.
    fn delete_all_for_org(&self, org_id: OrganizationId) -> StoreResult<usize>;
    /// Removes every sector of an organization inside a caller-owned
    /// transaction.
    fn delete_all_for_org_in_tx(
        &self,
        tx: &Transaction<'_>,
        org_id: OrganizationId,
    ) -> StoreResult<usize>;
}

/// SQLite-backed sector store.
pub struct SqliteSectorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectorRepository<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_table_ready(conn, "sectors", SECTOR_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SectorRepository for SqliteSectorRepository<'_> {
    fn create(&self, sector: &NewSector) -> StoreResult<SectorId> {
        insert_sector(self.conn, sector)
    }

    fn create_in_tx(&self, tx: &Transaction<'_>, sector: &NewSector) -> StoreResult<SectorId> {
        insert_sector(tx, sector)
    }

    fn find_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Sector>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SECTOR_SELECT_SQL}
             WHERE tenant_id = ?1
               AND code = ?2;"
        ))?;
        let mut rows = stmt.query(params![tenant_id, code])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sector_row(row)?));
        }
        Ok(None)
    }

    fn find_by_id(&self, tenant_id: TenantId, id: SectorId) -> StoreResult<Option<Sector>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SECTOR_SELECT_SQL}
             WHERE tenant_id = ?1
               AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![tenant_id, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sector_row(row)?));
        }
        Ok(None)
    }

    fn find_by_label(&self, tenant_id: TenantId, label: &str) -> StoreResult<Option<LabelMatch>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, code
                 FROM sectors
                 WHERE tenant_id = ?1
                   AND label = ?2
                 ORDER BY id ASC
                 LIMIT 1;",
                params![tenant_id, label],
                |row| {
                    Ok(LabelMatch {
                        id: row.get(0)?,
                        code: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    fn find_root(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
    ) -> StoreResult<Option<Sector>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SECTOR_SELECT_SQL}
             WHERE tenant_id = ?1
               AND org_id = ?2
               AND has_parent = 0
             ORDER BY id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![tenant_id, org_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sector_row(row)?));
        }
        Ok(None)
    }

    fn find_all_for_org(
        &self,
        tenant_id: TenantId,
        org_id: OrganizationId,
    ) -> StoreResult<Vec<Sector>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SECTOR_SELECT_SQL}
             WHERE tenant_id = ?1
               AND org_id = ?2
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params![tenant_id, org_id])?;
        let mut sectors = Vec::new();
        while let Some(row) = rows.next()? {
            sectors.push(parse_sector_row(row)?);
        }
        Ok(sectors)
    }

    fn rename(&self, tenant_id: TenantId, id: SectorId, label: &str) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE sectors
             SET label = ?3
             WHERE tenant_id = ?1
               AND id = ?2;",
            params![tenant_id, id, label],
        )?;
        Ok(changed)
    }

    fn delete(&self, tenant_id: TenantId, id: SectorId) -> StoreResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM sectors
             WHERE tenant_id = ?1
               AND (id = ?2 OR parent_id = ?2);",
            params![tenant_id, id],
        )?;
        Ok(removed)
    }

    fn delete_all_for_org(&self, org_id: OrganizationId) -> StoreResult<usize> {
        delete_sectors_of_org(self.conn, org_id)
    }

    fn delete_all_for_org_in_tx(
        &self,
        tx: &Transaction<'_>,
        org_id: OrganizationId,
    ) -> StoreResult<usize> {
        delete_sectors_of_org(tx, org_id)
    }
}

fn insert_sector(conn: &Connection, sector: &NewSector) -> StoreResult<SectorId> {
    conn.execute(
        "INSERT INTO sectors (
            tenant_id,
            org_id,
            code,
            label,
            parent_id,
            has_parent,
            depth,
            status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            sector.tenant_id,
            sector.org_id,
            sector.code.as_str(),
            sector.label.as_str(),
            sector.parent_id,
            bool_to_int(sector.has_parent),
            sector.depth,
            sector_status_to_db(sector.status),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn delete_sectors_of_org(conn: &Connection, org_id: OrganizationId) -> StoreResult<usize> {
    let removed = conn.execute("DELETE FROM sectors WHERE org_id = ?1;", [org_id])?;
    Ok(removed)
}

fn parse_sector_row(row: &Row<'_>) -> StoreResult<Sector> {
    let status_value: i64 = row.get("status")?;
    let status = parse_sector_status(status_value).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid sector status `{status_value}` in sectors.status"
        ))
    })?;
    let has_parent = parse_flag(row.get("has_parent")?, "sectors.has_parent")?;
    let parent_id: Option<SectorId> = row.get("parent_id")?;
    if has_parent != parent_id.is_some() {
        return Err(StoreError::InvalidData(format!(
            "sectors.has_parent={has_parent} disagrees with sectors.parent_id={parent_id:?}"
        )));
    }

    Ok(Sector {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        org_id: row.get("org_id")?,
        code: row.get("code")?,
        label: row.get("label")?,
        parent_id,
        has_parent,
        depth: row.get("depth")?,
        status,
    })
}

fn sector_status_to_db(status: SectorStatus) -> i64 {
    match status {
        SectorStatus::Draft => 0,
        SectorStatus::Active => 1,
        SectorStatus::Inactive => 2,
        SectorStatus::Deleted => 3,
    }
}

fn parse_sector_status(value: i64) -> Option<SectorStatus> {
    match value {
        0 => Some(SectorStatus::Draft),
        1 => Some(SectorStatus::Active),
        2 => Some(SectorStatus::Inactive),
        3 => Some(SectorStatus::Deleted),
        _ => None,
    }
}
