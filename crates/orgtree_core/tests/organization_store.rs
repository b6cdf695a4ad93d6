use orgtree_core::db::{open_db_in_memory, with_transaction};
use orgtree_core::{
    NewOrganization, OrganizationRepository, OrganizationStatus, OrganizationType,
    SqliteOrganizationRepository, StoreError,
};

fn new_organization(tenant_id: i64, code: &str, label: &str) -> NewOrganization {
    NewOrganization {
        tenant_id,
        code: code.to_string(),
        label: label.to_string(),
        kind: OrganizationType::Bu,
        status: OrganizationStatus::Draft,
    }
}

#[test]
fn create_and_find_by_code() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();

    let id = repo.create(&new_organization(1, "acme", "Acme")).unwrap();

    let loaded = repo.find_by_code(1, "acme").unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.tenant_id, 1);
    assert_eq!(loaded.label, "Acme");
    assert_eq!(loaded.kind, OrganizationType::Bu);
    assert_eq!(loaded.status, OrganizationStatus::Draft);
    assert_eq!(repo.find_by_code(2, "acme").unwrap(), None);
}

#[test]
fn existence_checks_are_per_tenant() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();
    repo.create(&new_organization(1, "acme", "Acme")).unwrap();

    assert!(repo.exists_by_code(1, "acme").unwrap());
    assert!(repo.exists_by_label(1, "Acme").unwrap());
    assert!(!repo.exists_by_code(2, "acme").unwrap());
    assert!(!repo.exists_by_label(2, "Acme").unwrap());
    assert!(!repo.exists_by_code(1, "globex").unwrap());
}

#[test]
fn same_code_is_allowed_in_another_tenant() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();
    repo.create(&new_organization(1, "acme", "Acme")).unwrap();
    repo.create(&new_organization(2, "acme", "Acme")).unwrap();

    assert_eq!(repo.find_all(1).unwrap().len(), 1);
    assert_eq!(repo.find_all(2).unwrap().len(), 1);
}

#[test]
fn duplicate_code_or_label_in_tenant_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();
    repo.create(&new_organization(1, "acme", "Acme")).unwrap();

    let code_err = repo
        .create(&new_organization(1, "acme", "Other"))
        .unwrap_err();
    assert!(code_err
        .unique_violation_detail()
        .unwrap()
        .contains("organizations.code"));

    let label_err = repo
        .create(&new_organization(1, "globex", "Acme"))
        .unwrap_err();
    assert!(label_err
        .unique_violation_detail()
        .unwrap()
        .contains("organizations.label"));
}

#[test]
fn find_all_lists_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();
    repo.create(&new_organization(1, "zeta", "Zeta")).unwrap();
    repo.create(&new_organization(1, "alpha", "Alpha")).unwrap();

    let codes: Vec<String> = repo
        .find_all(1)
        .unwrap()
        .into_iter()
        .map(|organization| organization.code)
        .collect();
    assert_eq!(codes, vec!["zeta".to_string(), "alpha".to_string()]);
}

#[test]
fn rename_and_delete_in_transaction() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();
    repo.create(&new_organization(1, "acme", "Acme")).unwrap();

    assert_eq!(repo.rename(1, "acme", "Acme Corp").unwrap(), 1);
    assert_eq!(repo.rename(1, "missing", "Nobody").unwrap(), 0);
    assert_eq!(
        repo.find_by_code(1, "acme").unwrap().unwrap().label,
        "Acme Corp"
    );

    let removed = with_transaction::<_, StoreError, _>(&conn, "test_delete", |tx| {
        repo.delete_in_tx(tx, 1, "acme")
    })
    .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(repo.find_by_code(1, "acme").unwrap(), None);
}

#[test]
fn failed_transaction_leaves_no_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::try_new(&conn).unwrap();

    let result = with_transaction::<(), StoreError, _>(&conn, "test_rollback", |tx| {
        repo.create_in_tx(tx, &new_organization(1, "acme", "Acme"))?;
        Err(StoreError::InvalidData("forced".to_string()))
    });

    assert!(matches!(result, Err(StoreError::InvalidData(_))));
    assert!(!repo.exists_by_code(1, "acme").unwrap());
}
