//! Well-known names and paths shared by every Keycloak component.

/// Authentication scheme name the plugin registers with the host.
pub const AUTHENTICATION_SCHEME: &str = "Keycloak";

/// Display name shown for the scheme in the host's login UI.
pub const DISPLAY_NAME: &str = "Keycloak";

/// System name of the plugin as known to the host's provider manager.
pub const PROVIDER_SYSTEM_NAME: &str = "Smartstore.Keycloak.Auth";

/// Redirect URI path. Must match the redirect URI registered in Keycloak.
pub const CALLBACK_PATH: &str = "/signin-keycloak";

/// Local endpoint that renders remote authentication failures.
pub const ERROR_CALLBACK_PATH: &str = "/identity/externalerrorcallback";

/// Host endpoint that starts an external login challenge.
pub const EXTERNAL_LOGIN_PATH: &str = "/identity/externallogin";

/// Provider value carried on the error callback URL.
pub const ERROR_CALLBACK_PROVIDER: &str = "keycloak";

/// Path segment that marks an authority URL as already realm-qualified.
pub const REALMS_SEGMENT: &str = "/realms/";

/// Suffix appended to a realm URL to reach the discovery document.
pub const WELL_KNOWN_CONFIGURATION: &str = "/.well-known/openid-configuration";

/// Scopes requested on every authorization request, in order.
pub const SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Store scope id that applies to all stores.
pub const ALL_STORES_SCOPE: u32 = 0;

/// Environment variable names. Values set here override persisted settings.
pub mod env {
    pub const AUTHORITY: &str = "SMARTSTORE_KEYCLOAK_AUTHORITY";
    pub const REALM: &str = "SMARTSTORE_KEYCLOAK_REALM";
    pub const CLIENT_ID: &str = "SMARTSTORE_KEYCLOAK_CLIENTID";
    pub const CLIENT_SECRET: &str = "SMARTSTORE_KEYCLOAK_CLIENTSECRET";
    /// Backend-reachable host used only for fetching the discovery document.
    pub const METADATA_AUTHORITY: &str = "SMARTSTORE_KEYCLOAK_METADATA_AUTHORITY";
    /// Development only. `true` or `1` disables backchannel certificate validation.
    pub const DANGEROUSLY_ACCEPT_ANY_CERT: &str = "SMARTSTORE_KEYCLOAK_DANGEROUSLY_ACCEPT_ANY_CERT";
}

/// Route serving the login button fragment.
pub const LOGIN_BUTTON_PATH: &str = "/keycloak/login-button";
