use crate::login::DEFAULT_TITLE;
use crate::options::PushedAuthorizationBehavior;

/// Host-side configuration of the Keycloak plugin.
#[derive(Clone, Debug)]
pub struct KeycloakAuthConfig {
    /// Public base URL of the store, used to compute the redirect URI.
    pub store_base_url: String,
    /// Store scope whose settings feed the resolver (`0` = all stores).
    pub store_id: u32,
    /// Base path of the admin configure routes (e.g. `/admin/keycloak`).
    pub admin_base_path: String,
    /// Caption of the login button.
    pub login_title: String,
    /// PAR behavior the host's default post-configuration applies to every scheme.
    pub host_pushed_authorization: PushedAuthorizationBehavior,
}

impl Default for KeycloakAuthConfig {
    fn default() -> Self {
        Self {
            store_base_url: "http://localhost:3000/".into(),
            store_id: 0,
            admin_base_path: "/admin/keycloak".into(),
            login_title: DEFAULT_TITLE.into(),
            host_pushed_authorization: PushedAuthorizationBehavior::UseIfAvailable,
        }
    }
}
