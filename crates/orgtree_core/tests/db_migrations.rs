use orgtree_core::db::migrations::latest_version;
use orgtree_core::db::{open_db, open_db_in_memory, open_db_with_options, DbError, DbOptions};
use orgtree_core::{SqliteSectorRepository, StoreError};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "organizations");
    assert_table_exists(&conn, "sectors");
    assert_index_exists(&conn, "idx_sectors_tenant_org");
    assert_index_exists(&conn, "idx_sectors_parent");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orgtree.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO organizations (tenant_id, code, label, type) VALUES (1, 'acme', 'Acme', 'bu');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let organizations: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM organizations;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(organizations, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bootstrap_enables_foreign_keys_and_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let options = DbOptions {
        busy_timeout: Duration::from_millis(1_234),
    };
    let conn = open_db_with_options(dir.path().join("pragmas.sqlite3"), &options).unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
    assert_eq!(busy_timeout, 1_234);
}

#[test]
fn schema_rejects_inconsistent_root_flags() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO organizations (tenant_id, code, label, type) VALUES (1, 'acme', 'Acme', 'bu');",
        [],
    )
    .unwrap();

    let parentless_child = conn.execute(
        "INSERT INTO sectors (tenant_id, org_id, code, label, parent_id, has_parent, depth)
         VALUES (1, 1, 'x', 'X', NULL, 1, 1);",
        [],
    );
    assert!(parentless_child.is_err());

    let deep_root = conn.execute(
        "INSERT INTO sectors (tenant_id, org_id, code, label, parent_id, has_parent, depth)
         VALUES (1, 1, 'y', 'Y', NULL, 0, 2);",
        [],
    );
    assert!(deep_root.is_err());
}

#[test]
fn stores_reject_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = match SqliteSectorRepository::try_new(&conn) {
        Ok(_) => panic!("store accepted an unmigrated connection"),
        Err(err) => err,
    };
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
