//! Host-facing administrative surface.

use std::sync::Arc;

use crate::settings::{ConnectionSettings, SecureMode, SettingsPatch};
use crate::store::SettingsStore;
use crate::tester::{ConnectionTester, TestReport};
use crate::Result;

/// The surface an embedding application wires into its admin UI: settings
/// reads and writes, the port-suggestion hook for the settings form, and
/// the connection-test action.
pub struct DirectoryAdmin {
    store: Arc<dyn SettingsStore>,
    tester: ConnectionTester,
}

impl DirectoryAdmin {
    /// Creates the surface over a settings store, dialing with the bundled
    /// `ldap3` connector.
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            tester: ConnectionTester::new(store.clone()),
            store,
        }
    }

    /// Current settings. The record is created with defaults on first
    /// access.
    ///
    /// # Errors
    ///
    /// Returns a store error if the persistence layer fails.
    pub async fn settings(&self) -> Result<ConnectionSettings> {
        self.store.load().await
    }

    /// Applies a partial update to the singleton record and returns the
    /// new state.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the merged record is invalid; the
    /// stored record is then unchanged.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<ConnectionSettings> {
        self.store.update(patch).await
    }

    /// Conventional port for a secure mode, used by the settings form to
    /// pre-fill the port field when the operator switches modes. Advisory
    /// only; never applied on write.
    #[must_use]
    pub const fn suggested_port(mode: SecureMode) -> u16 {
        mode.suggested_port()
    }

    /// Performs a one-shot connection test against the current settings.
    ///
    /// # Errors
    ///
    /// Propagates the failing handshake step's error; see
    /// [`ConnectionTester::run`].
    pub async fn test_connection(&self) -> Result<TestReport> {
        self.tester.run().await
    }
}
