//! Directory (LDAP) connection management for embedding applications.
//!
//! This crate keeps a single persistent set of directory connection
//! parameters — server, port, transport-security mode and optional bind
//! credentials — and verifies them with a live handshake against the
//! configured server.
//!
//! ## Example
//!
//! ```ignore
//! use dirlink_ldap::{DirectoryAdmin, MemorySettingsStore, SecureMode, SettingsPatch};
//! use std::sync::Arc;
//!
//! let admin = DirectoryAdmin::new(Arc::new(MemorySettingsStore::new()));
//!
//! admin
//!     .update_settings(
//!         SettingsPatch::new()
//!             .with_server("dir.example.com")
//!             .with_secure(SecureMode::Tls),
//!     )
//!     .await?;
//!
//! let report = admin.test_connection().await?;
//! ```

#![deny(missing_docs)]

mod admin;
mod client;
mod settings;
mod store;
mod tester;

pub use admin::DirectoryAdmin;
pub use client::{DirectoryConnector, DirectorySession, LdapDirectoryConnector};
pub use settings::{
    compute_uri, ConnectionSettings, SecureMode, SettingsPatch, DEFAULT_LDAPS_PORT,
    DEFAULT_LDAP_PORT,
};
pub use store::{MemorySettingsStore, SettingsStore, SETTINGS_RECORD_ID};
pub use tester::{BoundAs, ConnectionTester, TestReport, TestState};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = dirlink_core::Result<T>;
