//! Registration, login and account lifecycle tests.

use super::helpers::*;
use crate::*;
use std::time::Duration;
use tenant_vault_backend::{MemoryBackendOptions, ResourceBackend, ScopePhase};

#[tokio::test(start_paused = true)]
async fn test_register_creates_scope_and_record() {
    let h = create_test_vault();

    h.vault.register("alice", "pw1").await.unwrap();

    let scope = h.backend.get_scope("user-alice").await.unwrap();
    assert_eq!(scope.phase, ScopePhase::Active);

    let record = h.backend.get_secret("user-alice", CREDENTIALS_SECRET).await.unwrap();
    assert_eq!(record.get("username").map(String::as_str), Some("alice"));
    let hash = record.get("password").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert_ne!(hash, "pw1");
}

#[tokio::test(start_paused = true)]
async fn test_register_waits_for_slow_scope() {
    let h = create_test_vault_with(MemoryBackendOptions {
        activation_polls: 5,
        ..Default::default()
    });

    h.vault.register("alice", "pw1").await.unwrap();
    assert!(h.vault.authenticate("alice", "pw1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_register_reports_not_ready() {
    let h = create_test_vault_with(MemoryBackendOptions {
        activation_polls: u32::MAX,
        ..Default::default()
    });

    let err = h.vault.register("alice", "pw1").await.unwrap_err();
    assert!(matches!(err, VaultError::NotReady { ref scope, .. } if scope == "user-alice"));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_registration_conflicts() {
    let h = create_test_vault();
    h.vault.register("alice", "pw1").await.unwrap();

    let err = h.vault.register("alice", "other").await.unwrap_err();
    assert!(matches!(err, VaultError::Conflict(_)));

    // Original password still works
    assert!(h.vault.authenticate("alice", "pw1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_register_completes_half_done_registration() {
    let h = create_test_vault();
    h.backend.create_scope("user-alice").await.unwrap();

    h.vault.register("alice", "pw1").await.unwrap();
    assert_eq!(h.backend.scope_count().await, 1);
    assert!(h.vault.authenticate("alice", "pw1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_register_rejects_bad_input() {
    let h = create_test_vault();

    for name in ["", "Alice", "al/ice", "-alice"] {
        assert!(matches!(
            h.vault.register(name, "pw").await,
            Err(VaultError::InvalidInput(_))
        ));
    }
    assert!(matches!(
        h.vault.register("alice", "").await,
        Err(VaultError::InvalidInput(_))
    ));
    assert_eq!(h.backend.scope_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_authenticate_issues_token_for_identity() {
    let h = create_test_vault();
    h.vault.register("alice", "pw1").await.unwrap();

    let issued = h.vault.authenticate("alice", "pw1").await.unwrap();
    assert_eq!(issued.token_type, "Bearer");
    assert_eq!(issued.expires_in, 24 * 60 * 60);

    let identity = h.vault.verify_token(&issued.token).await.unwrap();
    assert_eq!(identity.as_str(), "alice");
}

#[tokio::test(start_paused = true)]
async fn test_unknown_identity_and_wrong_password_look_alike() {
    let h = create_test_vault();
    h.vault.register("alice", "pw1").await.unwrap();

    let wrong_password = h.vault.authenticate("alice", "nope").await.unwrap_err();
    let unknown_user = h.vault.authenticate("mallory", "nope").await.unwrap_err();
    let invalid_name = h.vault.authenticate("NOT VALID", "nope").await.unwrap_err();

    for err in [&wrong_password, &unknown_user, &invalid_name] {
        match err {
            VaultError::Unauthorized(message) => assert_eq!(message, INVALID_CREDENTIALS),
            other => panic!("Expected Unauthorized, got: {:?}", other),
        }
    }
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_identity_still_verifies_a_digest() {
    let h = create_test_vault();

    let _ = h.vault.authenticate("mallory", "guess").await;
    assert_eq!(h.vault.hasher.verify_count(), 1);

    let _ = h.vault.authenticate("mallory", "guess").await;
    assert_eq!(h.vault.hasher.verify_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_record_is_unauthorized() {
    let h = create_test_vault();
    h.backend.create_scope("user-alice").await.unwrap();
    h.backend
        .create_secret("user-alice", CREDENTIALS_SECRET, &data(&[("username", "alice")]))
        .await
        .unwrap();

    let err = h.vault.authenticate("alice", "pw1").await.unwrap_err();
    assert!(matches!(err, VaultError::Unauthorized(ref m) if m == INVALID_CREDENTIALS));
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_hash_is_unauthorized() {
    let h = create_test_vault();
    h.backend.create_scope("user-alice").await.unwrap();
    h.backend
        .create_secret(
            "user-alice",
            CREDENTIALS_SECRET,
            &data(&[("username", "alice"), ("password", "pw1")]),
        )
        .await
        .unwrap();

    let err = h.vault.authenticate("alice", "pw1").await.unwrap_err();
    assert!(matches!(err, VaultError::Unauthorized(_)));
}

#[tokio::test(start_paused = true)]
async fn test_authenticate_surfaces_transient_backend() {
    let h = create_test_vault();
    h.vault.register("alice", "pw1").await.unwrap();
    h.backend.fail_next(1);

    let err = h.vault.authenticate("alice", "pw1").await.unwrap_err();
    assert!(matches!(err, VaultError::Transient(_)));
}

#[tokio::test(start_paused = true)]
async fn test_token_expires_after_ttl() {
    let h = create_test_vault();
    h.vault.register("alice", "pw1").await.unwrap();
    let issued = h.vault.authenticate("alice", "pw1").await.unwrap();

    h.clock.advance(Duration::from_secs(24 * 60 * 60));
    assert!(h.vault.verify_token(&issued.token).await.is_ok());

    h.clock.advance(Duration::from_millis(1));
    assert!(matches!(
        h.vault.verify_token(&issued.token).await,
        Err(VaultError::Unauthorized(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_token_issued_mid_second_expires_on_time() {
    let h = create_test_vault();
    h.vault.register("alice", "pw1").await.unwrap();

    h.clock.advance(Duration::from_millis(700));
    let issued = h.vault.authenticate("alice", "pw1").await.unwrap();

    h.clock.advance(h.vault.config().token_ttl);
    assert!(h.vault.verify_token(&issued.token).await.is_ok());

    h.clock.advance(Duration::from_millis(1));
    assert!(matches!(
        h.vault.verify_token(&issued.token).await,
        Err(VaultError::Unauthorized(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_garbage_token_is_unauthorized() {
    let h = create_test_vault();
    assert!(matches!(
        h.vault.verify_token("not.a.token").await,
        Err(VaultError::Unauthorized(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_change_secret_replaces_password_only() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    h.vault.change_secret(&alice, "pw2").await.unwrap();

    assert!(h.vault.authenticate("alice", "pw2").await.is_ok());
    assert!(matches!(
        h.vault.authenticate("alice", "pw1").await,
        Err(VaultError::Unauthorized(_))
    ));

    let record = h.backend.get_secret("user-alice", CREDENTIALS_SECRET).await.unwrap();
    assert_eq!(record.get("username").map(String::as_str), Some("alice"));
}

#[tokio::test(start_paused = true)]
async fn test_change_secret_keeps_extra_fields() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    let mut record = h.backend.get_secret("user-alice", CREDENTIALS_SECRET).await.unwrap();
    record.insert("note".to_string(), "keep me".to_string());
    h.backend
        .update_secret("user-alice", CREDENTIALS_SECRET, &record)
        .await
        .unwrap();

    h.vault.change_secret(&alice, "pw2").await.unwrap();

    let record = h.backend.get_secret("user-alice", CREDENTIALS_SECRET).await.unwrap();
    assert_eq!(record.get("note").map(String::as_str), Some("keep me"));
}

#[tokio::test(start_paused = true)]
async fn test_change_secret_rejects_empty() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    assert!(matches!(
        h.vault.change_secret(&alice, "").await,
        Err(VaultError::InvalidInput(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_delete_identity_removes_everything() {
    let h = create_test_vault_with(MemoryBackendOptions {
        removal_polls: 3,
        ..Default::default()
    });
    let alice = register_and_login(&h.vault, "alice", "pw1").await;
    h.vault
        .put_secret(&alice, "db", data(&[("password", "hunter2")]))
        .await
        .unwrap();

    h.vault.delete_identity(&alice).await.unwrap();

    assert!(!h.backend.contains_scope("user-alice").await);
    assert!(matches!(
        h.vault.authenticate("alice", "pw1").await,
        Err(VaultError::Unauthorized(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_delete_identity_forces_stuck_scope() {
    let h = create_test_vault_with(MemoryBackendOptions {
        stuck_finalizers: true,
        ..Default::default()
    });
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    h.vault.delete_identity(&alice).await.unwrap();

    assert_eq!(h.backend.finalize_calls(), 1);
    assert!(!h.backend.contains_scope("user-alice").await);
}

#[tokio::test(start_paused = true)]
async fn test_delete_identity_reports_stuck_resource() {
    let h = create_test_vault_with(MemoryBackendOptions {
        stuck_finalizers: true,
        ignore_finalize: true,
        ..Default::default()
    });
    let alice = register_and_login(&h.vault, "alice", "pw1").await;

    let err = h.vault.delete_identity(&alice).await.unwrap_err();
    assert!(matches!(err, VaultError::StuckResource { ref scope } if scope == "user-alice"));
}

#[tokio::test(start_paused = true)]
async fn test_reregister_after_delete() {
    let h = create_test_vault();
    let alice = register_and_login(&h.vault, "alice", "pw1").await;
    h.vault.delete_identity(&alice).await.unwrap();

    h.vault.register("alice", "fresh").await.unwrap();
    assert!(h.vault.authenticate("alice", "fresh").await.is_ok());
    assert!(h.vault.authenticate("alice", "pw1").await.is_err());
}
