//! The directory connection settings record.
//!
//! Exactly one settings record exists at any time; [`crate::store`] owns its
//! persistence. This module defines the record itself, the partial update
//! applied by administrative writes, and the pure derivations (connection
//! URI, suggested port) computed from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::Result;

/// Default LDAP port, conventional for the `never` and `tls` modes.
pub const DEFAULT_LDAP_PORT: u16 = 389;
/// Conventional LDAPS port, suggested when switching to the `ssl` mode.
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Transport-security mode of the directory connection.
///
/// The mode governs the URI scheme and the conventional default port. Note
/// that `tls` keeps the plain `ldap` scheme: security is negotiated with
/// Start TLS after connecting rather than implied by the scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecureMode {
    /// No transport security.
    #[default]
    Never,
    /// TLS from the first byte, over the `ldaps` scheme.
    Ssl,
    /// Start TLS negotiated on an initially plain connection.
    Tls,
}

impl SecureMode {
    /// URI scheme implied by this mode.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Ssl => "ldaps",
            Self::Never | Self::Tls => "ldap",
        }
    }

    /// Conventional port for this mode.
    ///
    /// Advisory only: a settings form pre-fills the port field with this
    /// value when the operator switches modes. It is never applied during a
    /// write and never overrides an explicitly supplied port.
    #[must_use]
    pub const fn suggested_port(self) -> u16 {
        match self {
            Self::Ssl => DEFAULT_LDAPS_PORT,
            Self::Never | Self::Tls => DEFAULT_LDAP_PORT,
        }
    }
}

impl fmt::Display for SecureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Never => "never",
            Self::Ssl => "ssl",
            Self::Tls => "tls",
        })
    }
}

/// Builds the connection URI from its parts.
///
/// The scheme is `ldaps` for [`SecureMode::Ssl`] and `ldap` otherwise. This
/// is a straight template: the server value is interpolated without
/// escaping, exactly as it was accepted at write time.
#[must_use]
pub fn compute_uri(server: &str, port: u16, secure: SecureMode) -> String {
    format!("{}://{server}:{port}/", secure.scheme())
}

const fn default_port() -> u16 {
    DEFAULT_LDAP_PORT
}

/// The singleton directory connection record.
///
/// Holds the server address, port, transport-security mode and optional
/// bind credentials. The connection URI is derived from the first three
/// fields on every read and is never stored.
///
/// Invariant, repaired on every write: `bind_pass` is never present while
/// `bind_dn` is absent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ConnectionSettings {
    /// Directory server hostname or address.
    #[validate(length(min = 1, message = "server is required"))]
    pub server: String,

    /// Directory server port.
    #[validate(range(min = 1, message = "port is required"))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Transport-security mode.
    #[serde(default)]
    pub secure: SecureMode,

    /// Distinguished name used for an authenticated bind. Absent means the
    /// directory is contacted with an anonymous bind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,

    /// Password paired with `bind_dn`. Never serialized.
    #[serde(default, skip_serializing)]
    pub bind_pass: Option<String>,

    /// Whether the server is an Active Directory. A stored preference for
    /// other consumers; nothing in this crate derives behavior from it.
    #[serde(default)]
    pub active_directory: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: DEFAULT_LDAP_PORT,
            secure: SecureMode::Never,
            bind_dn: None,
            bind_pass: None,
            active_directory: false,
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_pass",
                &self.bind_pass.as_ref().map(|_| "***REDACTED***"),
            )
            .field("active_directory", &self.active_directory)
            .finish()
    }
}

impl ConnectionSettings {
    /// Creates a validated settings record for the given server, with the
    /// default port and no transport security.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `server` is empty.
    pub fn new(server: impl Into<String>) -> Result<Self> {
        let settings = Self {
            server: server.into(),
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the transport-security mode.
    #[must_use]
    pub const fn with_secure(mut self, secure: SecureMode) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the bind DN and password used for an authenticated bind.
    #[must_use]
    pub fn with_bind(mut self, dn: impl Into<String>, password: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self.bind_pass = Some(password.into());
        self
    }

    /// Marks the server as an Active Directory.
    #[must_use]
    pub const fn with_active_directory(mut self, active_directory: bool) -> Self {
        self.active_directory = active_directory;
        self
    }

    /// Connection URI derived from `server`, `port` and `secure`.
    ///
    /// Recomputed on every call; the value is never cached or stored, so it
    /// can never go stale relative to the fields it derives from.
    #[must_use]
    pub fn uri(&self) -> String {
        compute_uri(&self.server, self.port, self.secure)
    }

    /// True once an operator has filled in a server address.
    ///
    /// A lazily created record starts with an empty server and is not
    /// usable for a connection test until configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty()
    }

    /// Merges a partial update into this record, repairs the credential
    /// coupling and validates the result.
    ///
    /// Clearing `bind_dn` (an absent or empty value after the merge)
    /// forcibly clears `bind_pass`, regardless of any password supplied in
    /// the same patch.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the merged record has an empty
    /// `server` or a zero `port`. `self` is left untouched either way.
    pub fn apply(&self, patch: &SettingsPatch) -> Result<Self> {
        let mut next = self.clone();

        if let Some(server) = &patch.server {
            next.server = server.clone();
        }
        if let Some(port) = patch.port {
            next.port = port;
        }
        if let Some(secure) = patch.secure {
            next.secure = secure;
        }
        if let Some(dn) = &patch.bind_dn {
            next.bind_dn = if dn.is_empty() { None } else { Some(dn.clone()) };
        }
        if let Some(password) = &patch.bind_pass {
            next.bind_pass = if password.is_empty() {
                None
            } else {
                Some(password.clone())
            };
        }
        if let Some(active_directory) = patch.active_directory {
            next.active_directory = active_directory;
        }

        // A password must never outlive its bind DN.
        if next.bind_dn.is_none() {
            next.bind_pass = None;
        }

        next.validate()?;
        Ok(next)
    }
}

/// Partial update applied to the singleton settings record.
///
/// `None` leaves a field untouched. For the optional bind fields an
/// explicit empty string clears the stored value.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    /// New server hostname or address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// New server port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// New transport-security mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<SecureMode>,

    /// New bind DN; an empty string clears it (and the stored password).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,

    /// New bind password; an empty string clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_pass: Option<String>,

    /// New Active Directory flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_directory: Option<bool>,
}

impl fmt::Debug for SettingsPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsPatch")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_pass",
                &self.bind_pass.as_ref().map(|_| "***REDACTED***"),
            )
            .field("active_directory", &self.active_directory)
            .finish()
    }
}

impl SettingsPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server.
    #[must_use]
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the transport-security mode.
    #[must_use]
    pub const fn with_secure(mut self, secure: SecureMode) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn with_bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self
    }

    /// Sets the bind password.
    #[must_use]
    pub fn with_bind_pass(mut self, password: impl Into<String>) -> Self {
        self.bind_pass = Some(password.into());
        self
    }

    /// Clears the bind DN, which also clears the stored password when the
    /// patch is applied.
    #[must_use]
    pub fn clear_bind_dn(mut self) -> Self {
        self.bind_dn = Some(String::new());
        self
    }

    /// Sets the Active Directory flag.
    #[must_use]
    pub const fn with_active_directory(mut self, active_directory: bool) -> Self {
        self.active_directory = Some(active_directory);
        self
    }
}
