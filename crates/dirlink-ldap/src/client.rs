//! Directory-protocol seam and its `ldap3`-backed implementation.

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings};
use tracing::debug;

use crate::Result;
use dirlink_core::Error;

/// A live directory session produced by a [`DirectoryConnector`].
///
/// Sessions are single-use: a connection test drives one session through
/// its steps and releases it. Dropping a session releases the transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectorySession: Send {
    /// Negotiates Start TLS on the session.
    async fn start_tls(&mut self) -> Result<()>;

    /// Performs an authenticated simple bind.
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()>;

    /// Performs an anonymous bind.
    async fn anonymous_bind(&mut self) -> Result<()>;

    /// Politely closes the session.
    async fn unbind(&mut self) -> Result<()>;
}

/// Opens directory sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Opens the transport to the directory server at `uri`.
    ///
    /// An `ldaps` URI establishes TLS during this call; an `ldap` URI
    /// leaves the channel plain unless [`DirectorySession::start_tls`] is
    /// invoked afterwards.
    async fn connect(&self, uri: &str) -> Result<Box<dyn DirectorySession>>;
}

/// Production connector backed by `ldap3`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapDirectoryConnector;

#[async_trait]
impl DirectoryConnector for LdapDirectoryConnector {
    async fn connect(&self, uri: &str) -> Result<Box<dyn DirectorySession>> {
        let (conn, ldap) = LdapConnAsync::new(uri).await.map_err(transport_error)?;
        ldap3::drive!(conn);
        debug!(%uri, "directory transport opened");
        Ok(Box::new(LdapDirectorySession {
            inner: ldap,
            uri: uri.to_string(),
        }))
    }
}

struct LdapDirectorySession {
    inner: ldap3::Ldap,
    uri: String,
}

#[async_trait]
impl DirectorySession for LdapDirectorySession {
    async fn start_tls(&mut self) -> Result<()> {
        // ldap3 negotiates StartTLS only while a connection is being
        // established, so the upgrade re-dials the same URI with the
        // negotiation enabled and swaps the handle. A failure here never
        // leaves a usable plaintext session behind.
        let settings = LdapConnSettings::new().set_starttls(true);
        let (conn, upgraded) = LdapConnAsync::with_settings(settings, &self.uri)
            .await
            .map_err(secure_channel_error)?;
        ldap3::drive!(conn);

        let mut plain = std::mem::replace(&mut self.inner, upgraded);
        let _ = plain.unbind().await;
        debug!(uri = %self.uri, "directory channel secured");
        Ok(())
    }

    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()> {
        let result = self
            .inner
            .simple_bind(dn, password)
            .await
            .map_err(bind_error)?;
        // Refusals come back as a result code, not a transport error.
        result.success().map_err(bind_error)?;
        Ok(())
    }

    async fn anonymous_bind(&mut self) -> Result<()> {
        // On the wire an anonymous bind is a simple bind with an empty
        // name and password.
        self.simple_bind("", "").await
    }

    async fn unbind(&mut self) -> Result<()> {
        self.inner.unbind().await.map_err(transport_error)
    }
}

fn transport_error(err: ldap3::LdapError) -> Error {
    Error::Transport(err.to_string())
}

fn secure_channel_error(err: ldap3::LdapError) -> Error {
    Error::SecureChannel(err.to_string())
}

fn bind_error(err: ldap3::LdapError) -> Error {
    Error::Bind(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ldap_errors_map_to_the_step_variants() {
        assert!(matches!(
            transport_error(ldap3::LdapError::EndOfStream),
            Error::Transport(_)
        ));
        assert!(matches!(
            secure_channel_error(ldap3::LdapError::EndOfStream),
            Error::SecureChannel(_)
        ));
        assert!(matches!(
            bind_error(ldap3::LdapError::EndOfStream),
            Error::Bind(_)
        ));
    }

    #[tokio::test]
    async fn mock_sessions_are_single_use_objects() {
        let mut session = MockDirectorySession::new();
        session.expect_anonymous_bind().times(1).returning(|| Ok(()));
        session.expect_unbind().times(1).returning(|| Ok(()));

        let mut boxed: Box<dyn DirectorySession> = Box::new(session);
        boxed.anonymous_bind().await.unwrap();
        boxed.unbind().await.unwrap();
    }
}
