//! Keycloak external authentication for an axum host.
//!
//! Resolves OpenID Connect client options for the `Keycloak` scheme from
//! environment variables and persisted store settings, keeps them fresh when
//! an administrator saves new settings, and renders the login button. The
//! OpenID Connect handler itself is provided by the host.
//!
//! # Example
//!
//! ```ignore
//! use keycloak_auth::{InMemorySettingsStore, KeycloakAuth, KeycloakSettings};
//!
//! let store = InMemorySettingsStore::new().with_settings(KeycloakSettings::new(
//!     "https://kc.example.com",
//!     "shop",
//!     "storefront",
//!     "secret",
//! ));
//!
//! let keycloak = KeycloakAuth::new()
//!     .store_base_url("https://shop.example.com/")
//!     .with_settings_store(store)
//!     .build();
//!
//! let options = keycloak.options();
//! assert_eq!(options.authority.as_deref(), Some("https://kc.example.com/realms/shop"));
//!
//! let app = axum::Router::new().merge(keycloak.router());
//! ```

pub mod admin;
pub mod cache;
pub mod config;
pub mod defaults;
pub mod env;
pub mod error;
pub mod login;
pub mod options;
pub mod pipeline;
pub mod post_configure;
pub mod remote_failure;
pub mod resolver;
pub mod settings;

mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

pub use admin::{ConfigurationModel, KeycloakAdmin};
pub use cache::OptionsCache;
pub use config::KeycloakAuthConfig;
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::KeycloakAuthError;
pub use login::LoginButton;
pub use options::{AuthenticationOptions, OpenIdConnectOptions, PushedAuthorizationBehavior};
pub use pipeline::{OptionsMonitor, OptionsPipeline};
pub use post_configure::{enforce, KeycloakPostConfigure, OidcDefaultPostConfigure};
pub use remote_failure::RemoteFailureContext;
pub use resolver::{resolve, resolve_options, KeycloakOptionsConfigurer};
pub use settings::{InMemorySettingsStore, KeycloakSettings, SettingsStore};

use defaults::{AUTHENTICATION_SCHEME, LOGIN_BUTTON_PATH};
use pipeline::ConfigureOptions;

/// Builder that registers the Keycloak plugin with the host.
pub struct KeycloakAuth {
    config: KeycloakAuthConfig,
    settings: Option<Arc<dyn SettingsStore>>,
    env: Option<Arc<dyn EnvSource>>,
}

impl KeycloakAuth {
    /// Defaults: in-memory settings, process environment, store URL `http://localhost:3000/`.
    pub fn new() -> Self {
        Self {
            config: KeycloakAuthConfig::default(),
            settings: None,
            env: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: KeycloakAuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the public base URL of the store.
    pub fn store_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.store_base_url = url.into();
        self
    }

    /// Set the store scope whose settings are resolved.
    pub fn store_id(mut self, store_id: u32) -> Self {
        self.config.store_id = store_id;
        self
    }

    /// Set the base path of the admin routes.
    pub fn admin_base_path(mut self, path: impl Into<String>) -> Self {
        self.config.admin_base_path = path.into();
        self
    }

    /// Set the login button caption.
    pub fn login_title(mut self, title: impl Into<String>) -> Self {
        self.config.login_title = title.into();
        self
    }

    /// Set the settings store.
    pub fn with_settings_store(mut self, store: impl SettingsStore) -> Self {
        self.settings = Some(Arc::new(store));
        self
    }

    /// Set the environment the resolver reads overrides from.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Some(Arc::new(env));
        self
    }

    /// Wire the resolver, the host's default post-configuration and the PAR
    /// enforcer into one options pipeline, in that order.
    pub fn build(self) -> KeycloakRuntime {
        let settings = self
            .settings
            .unwrap_or_else(|| Arc::new(InMemorySettingsStore::new()) as Arc<dyn SettingsStore>);
        let env = self
            .env
            .unwrap_or_else(|| Arc::new(ProcessEnv) as Arc<dyn EnvSource>);

        let configurer = Arc::new(KeycloakOptionsConfigurer::new(
            settings.clone(),
            env,
            self.config.store_id,
        ));
        let pipeline = OptionsPipeline::<OpenIdConnectOptions>::new()
            .configure(configurer.clone())
            .post_configure(Arc::new(OidcDefaultPostConfigure::new(
                self.config.host_pushed_authorization,
            )))
            .post_configure(Arc::new(KeycloakPostConfigure));
        let monitor = OptionsMonitor::new(pipeline);

        let admin = KeycloakAdmin::new(
            settings,
            monitor.cache().clone(),
            self.config.store_base_url.clone(),
        );
        let login = LoginButton::new().title(self.config.login_title.clone());

        info!(
            scheme = AUTHENTICATION_SCHEME,
            store_id = self.config.store_id,
            "Keycloak authentication registered"
        );

        KeycloakRuntime {
            inner: Arc::new(RuntimeInner {
                config: self.config,
                configurer,
                monitor,
                admin,
                login,
            }),
        }
    }
}

impl Default for KeycloakAuth {
    fn default() -> Self {
        Self::new()
    }
}

struct RuntimeInner {
    config: KeycloakAuthConfig,
    configurer: Arc<KeycloakOptionsConfigurer>,
    monitor: OptionsMonitor<OpenIdConnectOptions>,
    admin: KeycloakAdmin,
    login: LoginButton,
}

/// The installed plugin. Cheap to clone.
#[derive(Clone)]
pub struct KeycloakRuntime {
    inner: Arc<RuntimeInner>,
}

impl KeycloakRuntime {
    /// Current options for the Keycloak scheme, resolved on first use after
    /// startup or after the last settings save.
    pub fn options(&self) -> Arc<OpenIdConnectOptions> {
        self.inner.monitor.get(AUTHENTICATION_SCHEME)
    }

    /// The options monitor, shared with the host's OpenID Connect handler.
    pub fn monitor(&self) -> &OptionsMonitor<OpenIdConnectOptions> {
        &self.inner.monitor
    }

    /// Register the Keycloak scheme with the host's scheme table.
    pub fn configure_authentication(&self, options: &mut AuthenticationOptions) {
        self.inner.configurer.configure(options);
    }

    pub fn admin(&self) -> &KeycloakAdmin {
        &self.inner.admin
    }

    pub fn config(&self) -> &KeycloakAuthConfig {
        &self.inner.config
    }

    /// Login button HTML, or `None` when the provider is not configured.
    pub fn login_button(&self, return_url: Option<&str>) -> Option<String> {
        self.inner.login.render(&self.options(), return_url)
    }

    /// Run the remote-failure event for a provider error and return the
    /// resulting context.
    pub fn remote_failure(&self, message: Option<&str>) -> RemoteFailureContext {
        let mut context = RemoteFailureContext::new(message);
        self.options().events.remote_failure(&mut context);
        context
    }

    pub(crate) fn configure_path(&self) -> String {
        format!(
            "{}/configure",
            self.inner.config.admin_base_path.trim_end_matches('/')
        )
    }

    /// Admin configure routes and the login button fragment.
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                &self.configure_path(),
                get(handlers::configure_page).post(handlers::save_configuration),
            )
            .route(LOGIN_BUTTON_PATH, get(handlers::login_button))
            .with_state(self.clone())
    }
}

pub mod prelude {
    //! Re-exports of the most commonly used Keycloak types.
    pub use crate::{
        InMemorySettingsStore, KeycloakAuth, KeycloakRuntime, KeycloakSettings, SettingsStore,
    };
}
