use crate::defaults::{AUTHENTICATION_SCHEME, WELL_KNOWN_CONFIGURATION};
use crate::options::{OpenIdConnectOptions, PushedAuthorizationBehavior};
use crate::pipeline::PostConfigureOptions;

/// Re-assert that PAR is disabled for the Keycloak scheme.
///
/// Idempotent and touches nothing else, so it may run any number of times.
pub fn enforce(scheme: &str, options: &mut OpenIdConnectOptions) {
    if scheme != AUTHENTICATION_SCHEME {
        return;
    }
    options.pushed_authorization_behavior = PushedAuthorizationBehavior::Disable;
}

/// Post-configure stage running [`enforce`]. Register it after every other
/// post-configure stage for [`OpenIdConnectOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeycloakPostConfigure;

impl PostConfigureOptions<OpenIdConnectOptions> for KeycloakPostConfigure {
    fn post_configure(&self, name: &str, options: &mut OpenIdConnectOptions) {
        enforce(name, options);
    }
}

/// The host's generic OpenID Connect post-configuration, applied to every scheme.
///
/// Derives the discovery URL from the authority and resets PAR to the
/// configured default, which is why [`KeycloakPostConfigure`] must run after it.
#[derive(Debug, Clone, Copy)]
pub struct OidcDefaultPostConfigure {
    pushed_authorization_behavior: PushedAuthorizationBehavior,
}

impl OidcDefaultPostConfigure {
    pub fn new(pushed_authorization_behavior: PushedAuthorizationBehavior) -> Self {
        Self {
            pushed_authorization_behavior,
        }
    }
}

impl Default for OidcDefaultPostConfigure {
    fn default() -> Self {
        Self::new(PushedAuthorizationBehavior::UseIfAvailable)
    }
}

impl PostConfigureOptions<OpenIdConnectOptions> for OidcDefaultPostConfigure {
    fn post_configure(&self, _name: &str, options: &mut OpenIdConnectOptions) {
        if options.metadata_address.is_none() {
            if let Some(authority) = options.authority.as_deref().filter(|a| !a.is_empty()) {
                options.metadata_address = Some(format!(
                    "{}{WELL_KNOWN_CONFIGURATION}",
                    authority.trim_end_matches('/')
                ));
            }
        }
        options.pushed_authorization_behavior = self.pushed_authorization_behavior;
    }
}
