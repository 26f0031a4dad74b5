//! Integration tests for the administrative surface.
//!
//! These tests drive the exposed facade end-to-end against the bundled
//! in-memory store, without touching the network.

use std::sync::Arc;

use dirlink_core::Error;
use dirlink_ldap::{
    DirectoryAdmin, MemorySettingsStore, SecureMode, SettingsPatch, DEFAULT_LDAP_PORT,
};

fn admin() -> DirectoryAdmin {
    DirectoryAdmin::new(Arc::new(MemorySettingsStore::new()))
}

#[tokio::test]
async fn first_read_yields_the_default_record() {
    let admin = admin();

    let settings = admin.settings().await.unwrap();
    assert_eq!(settings.server, "");
    assert_eq!(settings.port, DEFAULT_LDAP_PORT);
    assert_eq!(settings.secure, SecureMode::Never);
    assert!(!settings.active_directory);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let admin = admin();

    let first = admin.settings().await.unwrap();
    let second = admin.settings().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.uri(), second.uri());
}

#[tokio::test]
async fn update_then_read_round_trips() {
    let admin = admin();

    admin
        .update_settings(
            SettingsPatch::new()
                .with_server("dir.example.com")
                .with_port(636)
                .with_secure(SecureMode::Ssl)
                .with_bind_dn("cn=admin,dc=example,dc=com")
                .with_bind_pass("x"),
        )
        .await
        .unwrap();

    let settings = admin.settings().await.unwrap();
    assert_eq!(settings.server, "dir.example.com");
    assert_eq!(settings.uri(), "ldaps://dir.example.com:636/");
    assert_eq!(
        settings.bind_dn.as_deref(),
        Some("cn=admin,dc=example,dc=com")
    );
    assert_eq!(settings.bind_pass.as_deref(), Some("x"));
}

#[tokio::test]
async fn clearing_the_bind_dn_discards_a_supplied_password() {
    let admin = admin();

    admin
        .update_settings(
            SettingsPatch::new()
                .with_server("dir.example.com")
                .with_bind_dn("cn=admin,dc=example,dc=com")
                .with_bind_pass("secret"),
        )
        .await
        .unwrap();

    // Field order in the patch is irrelevant: the override runs after the
    // merge.
    let settings = admin
        .update_settings(SettingsPatch::new().clear_bind_dn().with_bind_pass("secret"))
        .await
        .unwrap();

    assert!(settings.bind_dn.is_none());
    assert!(settings.bind_pass.is_none());
}

#[tokio::test]
async fn invalid_updates_leave_the_record_unchanged() {
    let admin = admin();

    admin
        .update_settings(SettingsPatch::new().with_server("dir.example.com"))
        .await
        .unwrap();
    let before = admin.settings().await.unwrap();

    let result = admin
        .update_settings(SettingsPatch::new().with_server("").with_port(0))
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));

    assert_eq!(admin.settings().await.unwrap(), before);
}

#[test]
fn unknown_secure_modes_are_rejected_at_the_boundary() {
    let patch = serde_json::from_str::<SettingsPatch>(r#"{"secure": "bogus"}"#);
    let err: Error = patch.unwrap_err().into();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn suggested_ports_match_the_conventional_defaults() {
    assert_eq!(DirectoryAdmin::suggested_port(SecureMode::Ssl), 636);
    assert_eq!(DirectoryAdmin::suggested_port(SecureMode::Never), 389);
    assert_eq!(DirectoryAdmin::suggested_port(SecureMode::Tls), 389);
}

#[tokio::test]
async fn suggested_port_never_overrides_an_explicit_port() {
    let admin = admin();

    let settings = admin
        .update_settings(
            SettingsPatch::new()
                .with_server("dir.example.com")
                .with_secure(SecureMode::Ssl)
                .with_port(10636),
        )
        .await
        .unwrap();

    assert_eq!(settings.port, 10636);
    assert_eq!(settings.uri(), "ldaps://dir.example.com:10636/");
}

#[tokio::test]
async fn testing_an_unconfigured_record_fails_before_dialing() {
    let admin = admin();

    let result = admin.test_connection().await;
    assert!(matches!(result, Err(Error::NotConfigured(_))));
}
