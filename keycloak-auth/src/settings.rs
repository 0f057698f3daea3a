use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::defaults::ALL_STORES_SCOPE;

/// Persisted Keycloak settings, edited through the admin configure page.
///
/// Every field may be empty. An empty authority disables the provider.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeycloakSettings {
    /// Keycloak server URL, e.g. `https://keycloak.example.com`. May already
    /// include the realm path (`.../realms/{realm}`).
    pub authority: String,
    /// Realm name. Ignored when the authority already names a realm.
    pub realm: String,
    /// OAuth 2.0 client ID configured in Keycloak.
    pub client_id: String,
    /// OAuth 2.0 client secret configured in Keycloak.
    pub client_secret: String,
}

impl KeycloakSettings {
    pub fn new(
        authority: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            authority: authority.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for KeycloakSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakSettings")
            .field("authority", &self.authority)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .finish()
    }
}

pub(crate) fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Settings persistence failure.
#[derive(Debug)]
pub enum SettingsError {
    /// The backing store could not be read.
    Load(String),
    /// The backing store rejected the write.
    Save(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Load(msg) => write!(f, "Settings load error: {msg}"),
            SettingsError::Save(msg) => write!(f, "Settings save error: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Pluggable settings persistence, keyed by store scope.
///
/// Scope `0` holds the values shared by all stores. Implementations return
/// the all-stores record when a scope has no record of its own, and the empty
/// record when neither exists.
///
/// `load` runs while the options cache holds the entry for the scheme being
/// built. It must not call back into the options monitor.
pub trait SettingsStore: Send + Sync + 'static {
    /// Load the settings that apply to `store_id`.
    fn load(&self, store_id: u32) -> Result<KeycloakSettings, SettingsError>;
    /// Persist `settings` for `store_id`.
    fn save(&self, store_id: u32, settings: KeycloakSettings) -> Result<(), SettingsError>;
}

/// In-memory settings store for development and testing.
#[derive(Clone, Default)]
pub struct InMemorySettingsStore {
    records: Arc<DashMap<u32, KeycloakSettings>>,
}

impl InMemorySettingsStore {
    /// Create an empty store. Every scope loads the empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the all-stores record.
    pub fn with_settings(self, settings: KeycloakSettings) -> Self {
        self.records.insert(ALL_STORES_SCOPE, settings);
        self
    }

    /// Seed the record of a single store.
    pub fn with_store_settings(self, store_id: u32, settings: KeycloakSettings) -> Self {
        self.records.insert(store_id, settings);
        self
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self, store_id: u32) -> Result<KeycloakSettings, SettingsError> {
        let record = self
            .records
            .get(&store_id)
            .or_else(|| self.records.get(&ALL_STORES_SCOPE))
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        Ok(record)
    }

    fn save(&self, store_id: u32, settings: KeycloakSettings) -> Result<(), SettingsError> {
        self.records.insert(store_id, settings);
        Ok(())
    }
}
