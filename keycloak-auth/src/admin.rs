//! Admin configure page: load and save the Keycloak settings of a store scope.

use std::sync::Arc;

use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::OptionsCache;
use crate::defaults::{AUTHENTICATION_SCHEME, CALLBACK_PATH, PROVIDER_SYSTEM_NAME};
use crate::error::KeycloakAuthError;
use crate::options::OpenIdConnectOptions;
use crate::settings::{redacted, KeycloakSettings, SettingsStore};

/// Form model of the configure page.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigurationModel {
    #[garde(length(max = 400), custom(validate_authority))]
    pub authority: String,
    #[garde(length(max = 400), custom(validate_realm))]
    pub realm: String,
    #[garde(length(max = 400))]
    pub client_id: String,
    #[garde(length(max = 400))]
    pub client_secret: String,
    /// Redirect URI to register in Keycloak. Computed, never persisted.
    #[garde(skip)]
    pub redirect_url: String,
}

impl ConfigurationModel {
    fn from_settings(settings: KeycloakSettings, redirect_url: String) -> Self {
        Self {
            authority: settings.authority,
            realm: settings.realm,
            client_id: settings.client_id,
            client_secret: settings.client_secret,
            redirect_url,
        }
    }

    fn into_settings(self) -> KeycloakSettings {
        KeycloakSettings {
            authority: self.authority,
            realm: self.realm,
            client_id: self.client_id,
            client_secret: self.client_secret,
        }
    }
}

impl std::fmt::Debug for ConfigurationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationModel")
            .field("authority", &self.authority)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

fn validate_authority(value: &str, _ctx: &()) -> garde::Result {
    if value.is_empty() {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        Ok(_) => Err(garde::Error::new("authority must be an http or https URL")),
        Err(err) => Err(garde::Error::new(format!("authority is not a valid URL: {err}"))),
    }
}

fn validate_realm(value: &str, _ctx: &()) -> garde::Result {
    if value.contains('/') {
        return Err(garde::Error::new("realm must not contain '/'"));
    }
    Ok(())
}

/// Configure page view data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePage {
    pub provider: &'static str,
    pub store_scope: u32,
    pub model: ConfigurationModel,
}

/// Loads and saves settings, invalidating cached options on save.
#[derive(Clone)]
pub struct KeycloakAdmin {
    settings: Arc<dyn SettingsStore>,
    cache: OptionsCache<OpenIdConnectOptions>,
    store_base_url: String,
}

impl KeycloakAdmin {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        cache: OptionsCache<OpenIdConnectOptions>,
        store_base_url: impl Into<String>,
    ) -> Self {
        let mut store_base_url = store_base_url.into();
        if !store_base_url.ends_with('/') {
            store_base_url.push('/');
        }
        Self {
            settings,
            cache,
            store_base_url,
        }
    }

    /// Redirect URI to register in Keycloak: `{store base url}signin-keycloak`.
    pub fn redirect_url(&self) -> String {
        format!("{}{}", self.store_base_url, CALLBACK_PATH.trim_start_matches('/'))
    }

    /// View data for the configure page of `store_scope`.
    pub fn configure_page(&self, store_scope: u32) -> Result<ConfigurePage, KeycloakAuthError> {
        let settings = self.settings.load(store_scope)?;
        Ok(ConfigurePage {
            provider: PROVIDER_SYSTEM_NAME,
            store_scope,
            model: ConfigurationModel::from_settings(settings, self.redirect_url()),
        })
    }

    /// Validate and persist `model` for `store_scope`.
    ///
    /// On success the cached Keycloak options are evicted before returning, so
    /// the next request resolves with the new values. On failure nothing is
    /// saved or evicted.
    pub fn save(&self, store_scope: u32, model: ConfigurationModel) -> Result<(), KeycloakAuthError> {
        model
            .validate()
            .map_err(|report| KeycloakAuthError::from_report(&report))?;

        self.settings.save(store_scope, model.into_settings())?;
        let evicted = self.cache.try_remove(AUTHENTICATION_SCHEME);
        info!(store_scope, evicted, "Keycloak settings saved");
        Ok(())
    }
}
