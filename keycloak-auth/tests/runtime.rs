use std::sync::Arc;

use keycloak_auth::defaults::env as vars;
use keycloak_auth::options::HandlerKind;
use keycloak_auth::{
    AuthenticationOptions, ConfigurationModel, InMemorySettingsStore, KeycloakAuth,
    KeycloakAuthError, KeycloakSettings, MapEnv, PushedAuthorizationBehavior, SettingsStore,
};

fn configured_store() -> InMemorySettingsStore {
    InMemorySettingsStore::new().with_settings(KeycloakSettings::new(
        "https://kc.example.com",
        "shop",
        "storefront",
        "s3cret",
    ))
}

fn model(authority: &str, realm: &str, client_id: &str, client_secret: &str) -> ConfigurationModel {
    ConfigurationModel {
        authority: authority.into(),
        realm: realm.into(),
        client_id: client_id.into(),
        client_secret: client_secret.into(),
        ..Default::default()
    }
}

#[test]
fn test_options_are_cached_until_save() {
    let store = configured_store();
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(store.clone())
        .build();

    let first = keycloak.options();
    assert_eq!(
        first.authority.as_deref(),
        Some("https://kc.example.com/realms/shop")
    );

    // Writing to the store behind the plugin's back does not refresh the cache.
    store
        .save(0, KeycloakSettings::new("https://other", "x", "y", "z"))
        .unwrap();
    assert!(Arc::ptr_eq(&first, &keycloak.options()));
}

#[test]
fn test_save_is_visible_on_next_resolution() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(configured_store())
        .build();
    assert_eq!(keycloak.options().client_id, "storefront");

    keycloak
        .admin()
        .save(0, model("https://sso.example.org", "outlet", "new-client", "new-secret"))
        .unwrap();

    let options = keycloak.options();
    assert_eq!(
        options.authority.as_deref(),
        Some("https://sso.example.org/realms/outlet")
    );
    assert_eq!(options.client_id, "new-client");
    assert_eq!(options.client_secret, "new-secret");
}

#[test]
fn test_invalid_save_keeps_previous_settings() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(configured_store())
        .build();
    let before = keycloak.options();

    let err = keycloak
        .admin()
        .save(0, model("not a url", "shop", "id", "secret"))
        .unwrap_err();
    match err {
        KeycloakAuthError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "authority");
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert!(Arc::ptr_eq(&before, &keycloak.options()));
    let page = keycloak.admin().configure_page(0).unwrap();
    assert_eq!(page.model.authority, "https://kc.example.com");
}

#[test]
fn test_env_still_wins_after_save() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new().with(vars::CLIENT_ID, "from-env"))
        .with_settings_store(configured_store())
        .build();

    keycloak
        .admin()
        .save(0, model("https://kc.example.com", "shop", "from-admin", "secret"))
        .unwrap();

    assert_eq!(keycloak.options().client_id, "from-env");
}

#[test]
fn test_par_disabled_after_host_post_configure() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(configured_store())
        .build();

    let options = keycloak.options();
    assert_eq!(
        options.pushed_authorization_behavior,
        PushedAuthorizationBehavior::Disable
    );
    // The host stage ran: it derived the discovery URL from the authority.
    assert_eq!(
        options.metadata_address.as_deref(),
        Some("https://kc.example.com/realms/shop/.well-known/openid-configuration")
    );
}

#[test]
fn test_unconfigured_store_builds_disabled_options() {
    let keycloak = KeycloakAuth::new().with_env(MapEnv::new()).build();

    let options = keycloak.options();
    assert!(options.authority.is_none());
    assert!(options.metadata_address.is_none());
    assert!(keycloak.login_button(None).is_none());
}

#[test]
fn test_store_scope_selects_settings() {
    let store = configured_store().with_store_settings(
        3,
        KeycloakSettings::new("https://kc.example.com", "outlet", "outlet-client", "x"),
    );
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(store)
        .store_id(3)
        .build();

    assert_eq!(
        keycloak.options().authority.as_deref(),
        Some("https://kc.example.com/realms/outlet")
    );
}

#[test]
fn test_login_button_requires_full_configuration() {
    let store = InMemorySettingsStore::new().with_settings(KeycloakSettings::new(
        "https://kc.example.com",
        "shop",
        "",
        "s3cret",
    ));
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(store)
        .build();

    assert!(keycloak.login_button(Some("/cart")).is_none());
}

#[test]
fn test_login_button_carries_return_url() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(configured_store())
        .login_title("Sign in with SSO")
        .build();

    let html = keycloak.login_button(Some("/checkout?step=2")).unwrap();
    assert!(html.contains(
        "href='/identity/externallogin?provider=Keycloak&amp;returnUrl=%2Fcheckout%3Fstep%3D2'"
    ));
    assert!(html.contains("<span>Sign in with SSO</span>"));
    assert!(html.contains("btn-brand-keycloak"));
    assert!(html.contains("rel='nofollow'"));
}

#[test]
fn test_remote_failure_through_runtime() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(configured_store())
        .build();

    let context = keycloak.remote_failure(Some("access_denied"));
    assert!(context.is_handled());
    assert_eq!(
        context.location(),
        Some("/identity/externalerrorcallback?provider=keycloak&errorMessage=access_denied")
    );

    let context = keycloak.remote_failure(None);
    assert_eq!(
        context.location(),
        Some("/identity/externalerrorcallback?provider=keycloak&errorMessage=Unknown+error")
    );
}

#[test]
fn test_registers_scheme_once() {
    let keycloak = KeycloakAuth::new().with_env(MapEnv::new()).build();
    let mut auth = AuthenticationOptions::default();

    keycloak.configure_authentication(&mut auth);
    keycloak.configure_authentication(&mut auth);

    assert_eq!(auth.schemes().len(), 1);
    let scheme = auth.scheme("Keycloak").unwrap();
    assert_eq!(scheme.display_name, "Keycloak");
    assert_eq!(scheme.handler, HandlerKind::OpenIdConnect);
}

#[test]
fn test_redirect_url_uses_store_base_url() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .store_base_url("https://shop.example.com")
        .build();

    assert_eq!(
        keycloak.admin().redirect_url(),
        "https://shop.example.com/signin-keycloak"
    );
    let page = keycloak.admin().configure_page(0).unwrap();
    assert_eq!(page.provider, "Smartstore.Keycloak.Auth");
    assert_eq!(page.model.redirect_url, "https://shop.example.com/signin-keycloak");
}

#[test]
fn test_concurrent_resolution_and_save() {
    let keycloak = KeycloakAuth::new()
        .with_env(MapEnv::new())
        .with_settings_store(configured_store())
        .build();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    assert!(keycloak.options().is_configured());
                }
            });
        }
        s.spawn(|| {
            for i in 0..50 {
                keycloak
                    .admin()
                    .save(0, model("https://kc.example.com", "shop", &format!("client-{i}"), "s"))
                    .unwrap();
            }
        });
    });

    assert_eq!(keycloak.options().client_id, "client-49");
}
