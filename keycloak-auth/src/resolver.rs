//! Resolves the Keycloak OpenID Connect options.
//!
//! Every value is looked up in the environment first and in the persisted
//! settings second. Resolution never fails: incomplete configuration leaves
//! the authority unset, which keeps the login button hidden.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::defaults::{self, env as vars, AUTHENTICATION_SCHEME, REALMS_SEGMENT};
use crate::env::EnvSource;
use crate::options::{
    AuthenticationOptions, Backchannel, HandlerKind, OidcEvents, OpenIdConnectOptions,
    PushedAuthorizationBehavior, ResponseType,
};
use crate::pipeline::{ConfigureNamedOptions, ConfigureOptions};
use crate::remote_failure::remote_failure_handler;
use crate::settings::{KeycloakSettings, SettingsStore};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Env,
    Settings,
    Unset,
}

impl ValueSource {
    fn as_str(&self) -> &'static str {
        match self {
            ValueSource::Env => "env",
            ValueSource::Settings => "settings",
            ValueSource::Unset => "unset",
        }
    }
}

/// Raw values after merging environment overrides over settings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Authority with trailing `/` removed.
    pub authority: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    /// Metadata authority with trailing `/` removed. Environment only.
    pub metadata_authority: String,
    pub accept_any_certificate: bool,
}

impl ResolvedConfig {
    /// Merge `env` over `settings`. Only non-empty values count as present.
    pub fn from_sources(env: &dyn EnvSource, settings: &KeycloakSettings) -> Self {
        let (authority, authority_src) = pick(env, vars::AUTHORITY, &settings.authority);
        let (realm, realm_src) = pick(env, vars::REALM, &settings.realm);
        let (client_id, client_id_src) = pick(env, vars::CLIENT_ID, &settings.client_id);
        let (client_secret, client_secret_src) =
            pick(env, vars::CLIENT_SECRET, &settings.client_secret);

        debug!(
            authority = authority_src.as_str(),
            realm = realm_src.as_str(),
            client_id = client_id_src.as_str(),
            client_secret = client_secret_src.as_str(),
            "Resolved Keycloak configuration sources"
        );

        Self {
            authority: trim_trailing_slashes(&authority).to_string(),
            realm,
            client_id,
            client_secret,
            metadata_authority: env
                .non_empty(vars::METADATA_AUTHORITY)
                .map(|v| trim_trailing_slashes(&v).to_string())
                .unwrap_or_default(),
            accept_any_certificate: env.flag(vars::DANGEROUSLY_ACCEPT_ANY_CERT),
        }
    }

    /// Realm-qualified authority URL, if one can be built.
    pub fn authority_url(&self) -> Option<String> {
        build_authority_url(&self.authority, &self.realm)
    }

    /// Discovery document URL on the metadata authority, if one is configured.
    pub fn metadata_address(&self) -> Option<String> {
        build_authority_url(&self.metadata_authority, &self.realm)
            .map(|url| format!("{url}{}", defaults::WELL_KNOWN_CONFIGURATION))
    }
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("authority", &self.authority)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &crate::settings::redacted(&self.client_secret))
            .field("metadata_authority", &self.metadata_authority)
            .field("accept_any_certificate", &self.accept_any_certificate)
            .finish()
    }
}

fn pick(env: &dyn EnvSource, name: &str, setting: &str) -> (String, ValueSource) {
    if let Some(value) = env.non_empty(name) {
        (value, ValueSource::Env)
    } else if !setting.is_empty() {
        (setting.to_string(), ValueSource::Settings)
    } else {
        (String::new(), ValueSource::Unset)
    }
}

fn trim_trailing_slashes(value: &str) -> &str {
    value.trim_end_matches('/')
}

/// Build the realm-qualified authority URL.
///
/// An authority that already contains `/realms/` is final and `realm` is
/// ignored. Otherwise `{authority}/realms/{realm}` is built when `realm` is
/// non-empty. Returns `None` when no realm can be determined.
pub fn build_authority_url(authority: &str, realm: &str) -> Option<String> {
    let authority = trim_trailing_slashes(authority);
    if authority.is_empty() {
        return None;
    }
    if authority.contains(REALMS_SEGMENT) {
        Some(authority.to_string())
    } else if !realm.is_empty() {
        Some(format!("{authority}{REALMS_SEGMENT}{realm}"))
    } else {
        None
    }
}

/// Populate `options` for `scheme` from `env` and `settings`.
///
/// Does nothing unless `scheme` is the Keycloak scheme. Fields owned by the
/// plugin are always overwritten, so repeated calls converge on the same result.
pub fn resolve(
    scheme: &str,
    env: &dyn EnvSource,
    settings: &KeycloakSettings,
    options: &mut OpenIdConnectOptions,
) {
    // An empty name is a foreign scheme too; the unnamed instance stays untouched.
    if scheme != AUTHENTICATION_SCHEME {
        return;
    }

    let config = ResolvedConfig::from_sources(env, settings);
    apply(&config, options);
}

/// Fresh Keycloak options built from the host defaults.
pub fn resolve_options(env: &dyn EnvSource, settings: &KeycloakSettings) -> OpenIdConnectOptions {
    let mut options = OpenIdConnectOptions::default();
    resolve(AUTHENTICATION_SCHEME, env, settings, &mut options);
    options
}

fn apply(config: &ResolvedConfig, options: &mut OpenIdConnectOptions) {
    options.authority = config.authority_url();
    if options.authority.is_none() {
        warn!(
            has_authority = !config.authority.is_empty(),
            has_realm = !config.realm.is_empty(),
            "Keycloak authority could not be determined, provider disabled"
        );
    }

    options.metadata_address = config.metadata_address();
    if let Some(metadata_address) = &options.metadata_address {
        debug!(%metadata_address, "Using separate Keycloak metadata address");
    }

    options.client_id = config.client_id.clone();
    options.client_secret = config.client_secret.clone();
    options.response_type = ResponseType::Code;
    options.save_tokens = true;
    options.get_claims_from_user_info_endpoint = true;
    options.callback_path = defaults::CALLBACK_PATH.to_string();
    options.pushed_authorization_behavior = PushedAuthorizationBehavior::Disable;

    options.backchannel = None;
    if config.accept_any_certificate {
        match Backchannel::accept_any_certificate() {
            Ok(backchannel) => {
                warn!("Keycloak backchannel accepts any server certificate. Never enable this in production");
                options.backchannel = Some(backchannel);
            }
            Err(err) => {
                warn!(error = %err, "Failed to build insecure Keycloak backchannel, keeping default");
            }
        }
    }

    options.scope.clear();
    options
        .scope
        .extend(defaults::SCOPES.iter().map(|s| s.to_string()));

    options.events = OidcEvents {
        on_remote_failure: Some(remote_failure_handler()),
    };
}

/// Configure stage wiring the resolver into the options pipeline.
///
/// Loads the settings of its store scope on every call; nothing is cached here.
pub struct KeycloakOptionsConfigurer {
    settings: Arc<dyn SettingsStore>,
    env: Arc<dyn EnvSource>,
    store_id: u32,
}

impl KeycloakOptionsConfigurer {
    pub fn new(settings: Arc<dyn SettingsStore>, env: Arc<dyn EnvSource>, store_id: u32) -> Self {
        Self {
            settings,
            env,
            store_id,
        }
    }

    fn load_settings(&self) -> KeycloakSettings {
        match self.settings.load(self.store_id) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, store_id = self.store_id, "Failed to load Keycloak settings");
                KeycloakSettings::default()
            }
        }
    }
}

impl ConfigureOptions<AuthenticationOptions> for KeycloakOptionsConfigurer {
    fn configure(&self, options: &mut AuthenticationOptions) {
        options.add_scheme(
            AUTHENTICATION_SCHEME,
            defaults::DISPLAY_NAME,
            HandlerKind::OpenIdConnect,
        );
    }
}

impl ConfigureNamedOptions<OpenIdConnectOptions> for KeycloakOptionsConfigurer {
    fn configure_named(&self, name: &str, options: &mut OpenIdConnectOptions) {
        // Includes the empty name.
        if name != AUTHENTICATION_SCHEME {
            return;
        }
        let settings = self.load_settings();
        resolve(name, self.env.as_ref(), &settings, options);
    }
}
