//! Persistence seam for the singleton settings record.
//!
//! The embedding application backs [`SettingsStore`] with its own record
//! layer; [`MemorySettingsStore`] is the bundled implementation used by
//! tests and by hosts that keep the record in process memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;
use tracing::debug;

use crate::settings::{ConnectionSettings, SettingsPatch};
use crate::Result;
use dirlink_core::Error;
use validator::Validate;

/// Well-known identifier of the singleton settings row.
pub const SETTINGS_RECORD_ID: u32 = 1;

/// Storage for the one directory connection record.
///
/// Implementations hold at most one record, address it by
/// [`SETTINGS_RECORD_ID`] and serialize writers under the host's ambient
/// transaction scope; the last committed write wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the current settings.
    ///
    /// The record is created with defaults on first access, so a fresh
    /// store yields an unconfigured record rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the underlying storage fails.
    async fn load(&self) -> Result<ConnectionSettings>;

    /// Applies a partial update to the record and returns the new state.
    ///
    /// Merging, credential repair and validation follow
    /// [`ConnectionSettings::apply`]; on a validation failure the stored
    /// record is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the merged record is invalid, or
    /// [`Error::Store`] if the underlying storage fails.
    async fn update(&self, patch: SettingsPatch) -> Result<ConnectionSettings>;
}

struct StoredRecord {
    id: u32,
    settings: ConnectionSettings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredRecord {
    fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            id: SETTINGS_RECORD_ID,
            settings: ConnectionSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// In-memory singleton-row store.
///
/// One record behind a lock. A second record can never be inserted: every
/// path goes through the single row, so "create" on an already-initialized
/// store simply writes the existing row.
#[derive(Default)]
pub struct MemorySettingsStore {
    record: RwLock<Option<StoredRecord>>,
}

impl MemorySettingsStore {
    /// Creates an empty store; the record appears on first access.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a validated record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `settings` does not validate.
    pub fn with_settings(settings: ConnectionSettings) -> Result<Self> {
        settings.validate()?;
        let store = Self::new();
        let now = Utc::now();
        *store.record.write().map_err(|_| poisoned())? = Some(StoredRecord {
            id: SETTINGS_RECORD_ID,
            settings,
            created_at: now,
            updated_at: now,
        });
        Ok(store)
    }

    /// When the record was last written, if it exists yet.
    #[must_use]
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.record
            .read()
            .ok()
            .and_then(|record| record.as_ref().map(|record| record.updated_at))
    }
}

fn poisoned() -> Error {
    Error::Store("settings store lock poisoned".to_string())
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<ConnectionSettings> {
        {
            let record = self.record.read().map_err(|_| poisoned())?;
            if let Some(record) = record.as_ref() {
                return Ok(record.settings.clone());
            }
        }

        let mut guard = self.record.write().map_err(|_| poisoned())?;
        // Another writer may have created the row between the two locks.
        let record = guard.get_or_insert_with(|| {
            debug!(id = SETTINGS_RECORD_ID, "creating default directory connection record");
            StoredRecord::with_defaults(Utc::now())
        });
        Ok(record.settings.clone())
    }

    async fn update(&self, patch: SettingsPatch) -> Result<ConnectionSettings> {
        let mut guard = self.record.write().map_err(|_| poisoned())?;
        let record = guard.get_or_insert_with(|| StoredRecord::with_defaults(Utc::now()));

        let next = record.settings.apply(&patch)?;
        record.settings = next.clone();
        record.updated_at = Utc::now();
        debug!(id = record.id, server = %next.server, "directory connection settings updated");
        Ok(next)
    }
}
