//! Option types consumed by the host's OpenID Connect handler.
//!
//! The handler itself (token exchange, validation, cookies) lives in the host.
//! These types only carry the configuration it runs with.

use std::sync::Arc;

use crate::remote_failure::RemoteFailureContext;
use crate::settings::redacted;

/// OAuth 2.0 response type requested at the authorization endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Implicit flow returning an ID token. Host default.
    #[default]
    IdToken,
    /// Authorization-code flow.
    Code,
    /// Hybrid flow.
    CodeIdToken,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::IdToken => "id_token",
            ResponseType::Code => "code",
            ResponseType::CodeIdToken => "code id_token",
        }
    }
}

/// How the handler uses Pushed Authorization Requests (RFC 9126).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushedAuthorizationBehavior {
    /// Use PAR when the discovery document advertises it. Host default.
    #[default]
    UseIfAvailable,
    /// Never use PAR.
    Disable,
    /// Fail if the provider does not support PAR.
    Require,
}

/// HTTP client used for server-to-server calls (discovery, token exchange).
#[derive(Clone)]
pub struct Backchannel {
    client: reqwest::Client,
    accepts_any_certificate: bool,
}

impl Backchannel {
    /// Backchannel that accepts any server certificate. Development only.
    pub fn accept_any_certificate() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            accepts_any_certificate: true,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn accepts_any_certificate(&self) -> bool {
        self.accepts_any_certificate
    }
}

impl std::fmt::Debug for Backchannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backchannel")
            .field("accepts_any_certificate", &self.accepts_any_certificate)
            .finish_non_exhaustive()
    }
}

/// Callback invoked when the remote provider reports an authentication failure.
pub type RemoteFailureHandler = Arc<dyn Fn(&mut RemoteFailureContext) + Send + Sync>;

/// Event callbacks raised by the handler.
#[derive(Clone, Default)]
pub struct OidcEvents {
    pub on_remote_failure: Option<RemoteFailureHandler>,
}

impl OidcEvents {
    /// Run the remote-failure callback, if one is installed.
    pub fn remote_failure(&self, context: &mut RemoteFailureContext) {
        if let Some(handler) = &self.on_remote_failure {
            handler(context);
        }
    }
}

impl std::fmt::Debug for OidcEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcEvents")
            .field("on_remote_failure", &self.on_remote_failure.is_some())
            .finish()
    }
}

/// OpenID Connect client options for one authentication scheme.
///
/// `Default` yields the host's defaults; the Keycloak resolver overwrites the
/// fields it owns.
#[derive(Clone)]
pub struct OpenIdConnectOptions {
    /// Issuer URL, e.g. `https://kc.example.com/realms/shop`.
    pub authority: Option<String>,
    /// Explicit discovery document URL. Derived from `authority` when unset.
    pub metadata_address: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    pub response_type: ResponseType,
    pub callback_path: String,
    pub scope: Vec<String>,
    pub save_tokens: bool,
    pub get_claims_from_user_info_endpoint: bool,
    pub pushed_authorization_behavior: PushedAuthorizationBehavior,
    /// Custom backchannel. `None` means the handler's default client.
    pub backchannel: Option<Backchannel>,
    pub events: OidcEvents,
}

impl Default for OpenIdConnectOptions {
    fn default() -> Self {
        Self {
            authority: None,
            metadata_address: None,
            client_id: String::new(),
            client_secret: String::new(),
            response_type: ResponseType::default(),
            callback_path: "/signin-oidc".into(),
            scope: vec!["openid".into(), "profile".into()],
            save_tokens: false,
            get_claims_from_user_info_endpoint: false,
            pushed_authorization_behavior: PushedAuthorizationBehavior::default(),
            backchannel: None,
            events: OidcEvents::default(),
        }
    }
}

impl OpenIdConnectOptions {
    /// `true` when authority, client ID and client secret are all present.
    pub fn is_configured(&self) -> bool {
        self.authority.as_deref().is_some_and(|a| !a.is_empty())
            && !self.client_id.is_empty()
            && !self.client_secret.is_empty()
    }
}

impl std::fmt::Debug for OpenIdConnectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenIdConnectOptions")
            .field("authority", &self.authority)
            .field("metadata_address", &self.metadata_address)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("response_type", &self.response_type)
            .field("callback_path", &self.callback_path)
            .field("scope", &self.scope)
            .field("save_tokens", &self.save_tokens)
            .field(
                "get_claims_from_user_info_endpoint",
                &self.get_claims_from_user_info_endpoint,
            )
            .field(
                "pushed_authorization_behavior",
                &self.pushed_authorization_behavior,
            )
            .field("backchannel", &self.backchannel)
            .field("events", &self.events)
            .finish()
    }
}

/// Handler implementation behind a registered scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    OpenIdConnect,
}

/// A scheme registered with the host's authentication system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationScheme {
    pub name: String,
    pub display_name: String,
    pub handler: HandlerKind,
}

/// The host's table of authentication schemes.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationOptions {
    schemes: Vec<AuthenticationScheme>,
}

impl AuthenticationOptions {
    /// Register a scheme. Returns `false` if the name is already taken.
    pub fn add_scheme(
        &mut self,
        name: impl Into<String>,
        display_name: impl Into<String>,
        handler: HandlerKind,
    ) -> bool {
        let name = name.into();
        if self.scheme(&name).is_some() {
            return false;
        }
        self.schemes.push(AuthenticationScheme {
            name,
            display_name: display_name.into(),
            handler,
        });
        true
    }

    pub fn scheme(&self, name: &str) -> Option<&AuthenticationScheme> {
        self.schemes.iter().find(|s| s.name == name)
    }

    pub fn schemes(&self) -> &[AuthenticationScheme] {
        &self.schemes
    }
}
