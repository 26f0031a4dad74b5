//! The connection test procedure.
//!
//! A test is a short-lived, two-state workflow: it reads the singleton
//! settings, performs the handshake steps strictly in order and either
//! reaches the terminal result state or aborts with the failing step's
//! error. Nothing is persisted and the connection is never reused.

use std::sync::Arc;
use tracing::{debug, info};

use crate::client::{DirectoryConnector, LdapDirectoryConnector};
use crate::settings::SecureMode;
use crate::store::SettingsStore;
use crate::Result;
use dirlink_core::Error;

/// Progression of a connection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestState {
    /// Entry state: the handshake is being performed.
    Test,
    /// Terminal state: the handshake succeeded.
    Result,
}

/// How the test session authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAs {
    /// Anonymous bind (no bind DN configured).
    Anonymous,
    /// Simple bind with the configured DN.
    Simple(String),
}

/// Terminal report of a successful connection test, rendered by the host's
/// action runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    /// State the procedure terminated in (always [`TestState::Result`]).
    pub state: TestState,
    /// The URI that was dialed.
    pub uri: String,
    /// How the session was bound.
    pub bound_as: BoundAs,
}

/// One-shot connection test against the current settings.
///
/// Every run reads the settings afresh, opens a new connection and
/// releases it before returning; connections are never cached, pooled or
/// shared between runs.
pub struct ConnectionTester {
    store: Arc<dyn SettingsStore>,
    connector: Box<dyn DirectoryConnector>,
}

impl ConnectionTester {
    /// Creates a tester that dials with the bundled `ldap3` connector.
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            connector: Box::new(LdapDirectoryConnector),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_connector(
        store: Arc<dyn SettingsStore>,
        connector: Box<dyn DirectoryConnector>,
    ) -> Self {
        Self { store, connector }
    }

    /// Runs the test.
    ///
    /// Step order: read settings, open the transport, negotiate Start TLS
    /// when the mode is `tls`, bind, release. Each step runs only if the
    /// previous one succeeded; the first failure aborts the whole run with
    /// that step's error. There are no retries and no fallback to another
    /// transport strategy.
    ///
    /// # Errors
    ///
    /// [`Error::NotConfigured`] when no server has been set,
    /// [`Error::Transport`], [`Error::SecureChannel`] or [`Error::Bind`]
    /// for the corresponding handshake step.
    pub async fn run(&self) -> Result<TestReport> {
        let settings = self.store.load().await?;
        if !settings.is_configured() {
            return Err(Error::NotConfigured(
                "no directory server has been set".to_string(),
            ));
        }

        let uri = settings.uri();
        debug!(%uri, state = ?TestState::Test, "testing directory connection");

        // Failure paths below drop the session, which releases the
        // transport; the success path unbinds first.
        let mut session = self.connector.connect(&uri).await?;

        if settings.secure == SecureMode::Tls {
            session.start_tls().await?;
        }

        let bound_as = match settings.bind_dn.as_deref() {
            Some(dn) if !dn.is_empty() => {
                let password = settings.bind_pass.as_deref().unwrap_or_default();
                session.simple_bind(dn, password).await?;
                BoundAs::Simple(dn.to_string())
            }
            _ => {
                session.anonymous_bind().await?;
                BoundAs::Anonymous
            }
        };

        let _ = session.unbind().await;

        info!(%uri, "directory connection test succeeded");
        Ok(TestReport {
            state: TestState::Result,
            uri,
            bound_as,
        })
    }
}
