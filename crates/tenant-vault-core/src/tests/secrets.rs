//! Secret CRUD and tenant isolation tests.

use super::helpers::*;
use crate::*;
use tenant_vault_backend::ResourceBackend;

#[tokio::test(start_paused = true)]
async fn test_secret_crud_round_trip() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    h.vault
        .put_secret(&alice, "db", data(&[("user", "root"), ("password", "hunter2")]))
        .await
        .unwrap();
    assert_eq!(
        h.vault.get_secret(&alice, "db").await.unwrap(),
        data(&[("user", "root"), ("password", "hunter2")])
    );

    h.vault
        .update_secret(&alice, "db", data(&[("password", "rotated")]))
        .await
        .unwrap();
    assert_eq!(
        h.vault.get_secret(&alice, "db").await.unwrap(),
        data(&[("password", "rotated")])
    );

    h.vault.delete_secret(&alice, "db").await.unwrap();
    assert!(matches!(
        h.vault.get_secret(&alice, "db").await,
        Err(VaultError::NotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_put_existing_secret_conflicts() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;
    h.vault.put_secret(&alice, "db", data(&[])).await.unwrap();

    assert!(matches!(
        h.vault.put_secret(&alice, "db", data(&[])).await,
        Err(VaultError::Conflict(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_missing_secret_is_not_found() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    assert!(matches!(
        h.vault.update_secret(&alice, "nope", data(&[])).await,
        Err(VaultError::NotFound(_))
    ));
    assert!(matches!(
        h.vault.delete_secret(&alice, "nope").await,
        Err(VaultError::NotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_credentials_record_is_not_reachable() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    assert!(matches!(
        h.vault.get_secret(&alice, CREDENTIALS_SECRET).await,
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        h.vault
            .update_secret(&alice, CREDENTIALS_SECRET, data(&[("password", "x")]))
            .await,
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        h.vault.delete_secret(&alice, CREDENTIALS_SECRET).await,
        Err(VaultError::InvalidInput(_))
    ));

    // Login unaffected
    assert!(h.vault.authenticate("alice", "pw1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_names_and_keys_rejected() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    assert!(matches!(
        h.vault.put_secret(&alice, "Bad_Name", data(&[])).await,
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        h.vault.put_secret(&alice, "ok", data(&[("bad key", "v")])).await,
        Err(VaultError::InvalidInput(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_list_omits_credentials() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;
    assert!(h.vault.list_secrets(&alice).await.unwrap().is_empty());

    h.vault.put_secret(&alice, "web", data(&[])).await.unwrap();
    h.vault.put_secret(&alice, "db", data(&[])).await.unwrap();

    assert_eq!(h.vault.list_secrets(&alice).await.unwrap(), vec!["db", "web"]);
}

#[tokio::test(start_paused = true)]
async fn test_tenants_are_isolated() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw-a").await;
    let bob = register_and_login(&h.vault, "bob", "pw-b").await;

    h.vault
        .put_secret(&alice, "db", data(&[("password", "alice-only")]))
        .await
        .unwrap();

    assert!(matches!(
        h.vault.get_secret(&bob, "db").await,
        Err(VaultError::NotFound(_))
    ));
    assert!(h.vault.list_secrets(&bob).await.unwrap().is_empty());

    // Bob's own secret with the same name lands in his scope
    h.vault
        .put_secret(&bob, "db", data(&[("password", "bob-only")]))
        .await
        .unwrap();
    h.vault.delete_secret(&bob, "db").await.unwrap();

    let alices = h.backend.get_secret("user-alice", "db").await.unwrap();
    assert_eq!(alices.get("password").map(String::as_str), Some("alice-only"));
    assert!(h.backend.get_secret("user-bob", "db").await.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_token_outliving_identity_is_unauthorized() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;
    h.vault.delete_identity(&alice).await.unwrap();

    // The identity value is still held, but its scope is gone
    assert!(matches!(
        h.vault.get_secret(&alice, "db").await,
        Err(VaultError::Unauthorized(_))
    ));
    assert!(matches!(
        h.vault.put_secret(&alice, "db", data(&[])).await,
        Err(VaultError::Unauthorized(_))
    ));
    assert!(matches!(
        h.vault.list_secrets(&alice).await,
        Err(VaultError::Unauthorized(_))
    ));
    assert!(matches!(
        h.vault.change_secret(&alice, "pw2").await,
        Err(VaultError::Unauthorized(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_transient_backend_failure_is_not_retried() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;
    h.backend.fail_next(1);

    assert!(matches!(
        h.vault.put_secret(&alice, "db", data(&[])).await,
        Err(VaultError::Transient(_))
    ));
    // The single failure was consumed; nothing was written
    assert!(h.vault.list_secrets(&alice).await.unwrap().is_empty());
}
