use keycloak_auth::defaults::env as vars;
use keycloak_auth::options::ResponseType;
use keycloak_auth::{
    enforce, resolve, resolve_options, KeycloakSettings, MapEnv, OpenIdConnectOptions,
    PushedAuthorizationBehavior, RemoteFailureContext,
};

fn settings() -> KeycloakSettings {
    KeycloakSettings::new("https://kc.example.com", "shop", "storefront", "s3cret")
}

#[test]
fn test_builds_realm_authority_from_settings() {
    let options = resolve_options(&MapEnv::new(), &settings());

    assert_eq!(
        options.authority.as_deref(),
        Some("https://kc.example.com/realms/shop")
    );
    assert_eq!(options.client_id, "storefront");
    assert_eq!(options.client_secret, "s3cret");
    assert!(options.metadata_address.is_none());
}

#[test]
fn test_realm_qualified_authority_ignores_realm() {
    let settings = KeycloakSettings::new(
        "https://kc.example.com/realms/shop",
        "ignored",
        "storefront",
        "s3cret",
    );
    let options = resolve_options(&MapEnv::new(), &settings);

    assert_eq!(
        options.authority.as_deref(),
        Some("https://kc.example.com/realms/shop")
    );
}

#[test]
fn test_trailing_slash_is_trimmed() {
    let settings = KeycloakSettings::new("https://kc.example.com/", "shop", "id", "secret");
    let options = resolve_options(&MapEnv::new(), &settings);

    assert_eq!(
        options.authority.as_deref(),
        Some("https://kc.example.com/realms/shop")
    );
}

#[test]
fn test_missing_realm_disables_provider() {
    let settings = KeycloakSettings::new("https://kc.example.com", "", "id", "secret");
    let options = resolve_options(&MapEnv::new(), &settings);

    assert!(options.authority.is_none());
    assert!(!options.is_configured());
}

#[test]
fn test_empty_settings_disable_provider() {
    let options = resolve_options(&MapEnv::new(), &KeycloakSettings::default());

    assert!(options.authority.is_none());
    assert!(options.client_id.is_empty());
    assert!(options.client_secret.is_empty());
    assert!(!options.is_configured());
}

#[test]
fn test_env_overrides_settings() {
    let env = MapEnv::new()
        .with(vars::AUTHORITY, "https://sso.internal/")
        .with(vars::REALM, "staging")
        .with(vars::CLIENT_ID, "env-client")
        .with(vars::CLIENT_SECRET, "env-secret");
    let options = resolve_options(&env, &settings());

    assert_eq!(
        options.authority.as_deref(),
        Some("https://sso.internal/realms/staging")
    );
    assert_eq!(options.client_id, "env-client");
    assert_eq!(options.client_secret, "env-secret");
}

#[test]
fn test_empty_env_values_fall_back_to_settings() {
    let env = MapEnv::new()
        .with(vars::AUTHORITY, "")
        .with(vars::REALM, "")
        .with(vars::CLIENT_ID, "");
    let options = resolve_options(&env, &settings());

    assert_eq!(
        options.authority.as_deref(),
        Some("https://kc.example.com/realms/shop")
    );
    assert_eq!(options.client_id, "storefront");
}

#[test]
fn test_env_realm_combines_with_settings_authority() {
    let env = MapEnv::new().with(vars::REALM, "outlet");
    let options = resolve_options(&env, &settings());

    assert_eq!(
        options.authority.as_deref(),
        Some("https://kc.example.com/realms/outlet")
    );
}

#[test]
fn test_metadata_authority_sets_metadata_address() {
    let env = MapEnv::new()
        .with(vars::AUTHORITY, "http://localhost:8080")
        .with(vars::METADATA_AUTHORITY, "http://host.docker.internal:8080/");
    let options = resolve_options(&env, &settings());

    assert_eq!(
        options.authority.as_deref(),
        Some("http://localhost:8080/realms/shop")
    );
    assert_eq!(
        options.metadata_address.as_deref(),
        Some("http://host.docker.internal:8080/realms/shop/.well-known/openid-configuration")
    );
}

#[test]
fn test_realm_qualified_metadata_authority_is_final() {
    let env = MapEnv::new().with(
        vars::METADATA_AUTHORITY,
        "http://keycloak:8080/realms/internal",
    );
    let options = resolve_options(&env, &settings());

    assert_eq!(
        options.metadata_address.as_deref(),
        Some("http://keycloak:8080/realms/internal/.well-known/openid-configuration")
    );
}

#[test]
fn test_metadata_authority_is_not_read_from_settings() {
    let options = resolve_options(&MapEnv::new(), &settings());
    assert!(options.metadata_address.is_none());
}

#[test]
fn test_metadata_authority_without_realm_stays_disabled() {
    let env = MapEnv::new().with(vars::METADATA_AUTHORITY, "http://keycloak:8080");
    let settings = KeycloakSettings::new("https://kc.example.com", "", "id", "secret");
    let options = resolve_options(&env, &settings);

    assert!(options.authority.is_none());
    assert!(options.metadata_address.is_none());
}

#[test]
fn test_fixed_protocol_values() {
    let options = resolve_options(&MapEnv::new(), &settings());

    assert_eq!(options.response_type, ResponseType::Code);
    assert_eq!(options.callback_path, "/signin-keycloak");
    assert_eq!(options.scope, vec!["openid", "profile", "email"]);
    assert!(options.save_tokens);
    assert!(options.get_claims_from_user_info_endpoint);
    assert_eq!(
        options.pushed_authorization_behavior,
        PushedAuthorizationBehavior::Disable
    );
}

#[test]
fn test_scopes_do_not_accumulate() {
    let mut options = OpenIdConnectOptions::default();
    options.scope.push("offline_access".into());

    for _ in 0..3 {
        resolve("Keycloak", &MapEnv::new(), &settings(), &mut options);
    }

    assert_eq!(options.scope, vec!["openid", "profile", "email"]);
}

#[test]
fn test_other_schemes_are_untouched() {
    let mut options = OpenIdConnectOptions::default();
    resolve("Google", &MapEnv::new(), &settings(), &mut options);
    resolve("", &MapEnv::new(), &settings(), &mut options);

    assert!(options.authority.is_none());
    assert!(options.client_id.is_empty());
    assert_eq!(options.callback_path, "/signin-oidc");
    assert_eq!(options.scope, vec!["openid", "profile"]);
    assert!(options.events.on_remote_failure.is_none());
}

#[test]
fn test_par_disabled_in_either_stage_order() {
    let env = MapEnv::new();

    let mut resolved_first = OpenIdConnectOptions::default();
    resolve("Keycloak", &env, &settings(), &mut resolved_first);
    enforce("Keycloak", &mut resolved_first);

    let mut enforced_first = OpenIdConnectOptions {
        pushed_authorization_behavior: PushedAuthorizationBehavior::Require,
        ..Default::default()
    };
    enforce("Keycloak", &mut enforced_first);
    resolve("Keycloak", &env, &settings(), &mut enforced_first);

    for options in [resolved_first, enforced_first] {
        assert_eq!(
            options.pushed_authorization_behavior,
            PushedAuthorizationBehavior::Disable
        );
    }
}

#[test]
fn test_certificate_bypass_requires_env_flag() {
    let options = resolve_options(&MapEnv::new(), &settings());
    assert!(options.backchannel.is_none());

    for value in ["true", "TRUE", "1"] {
        let env = MapEnv::new().with(vars::DANGEROUSLY_ACCEPT_ANY_CERT, value);
        let options = resolve_options(&env, &settings());
        let backchannel = options.backchannel.expect("insecure backchannel installed");
        assert!(backchannel.accepts_any_certificate());
    }

    for value in ["", "0", "false", "yes"] {
        let env = MapEnv::new().with(vars::DANGEROUSLY_ACCEPT_ANY_CERT, value);
        let options = resolve_options(&env, &settings());
        assert!(options.backchannel.is_none(), "value {value:?} must not enable bypass");
    }
}

#[test]
fn test_reused_options_drop_stale_env_overrides() {
    let env = MapEnv::new()
        .with(vars::DANGEROUSLY_ACCEPT_ANY_CERT, "true")
        .with(vars::METADATA_AUTHORITY, "http://old-host:8080");
    let mut options = OpenIdConnectOptions::default();

    resolve("Keycloak", &env, &settings(), &mut options);
    assert_eq!(
        options.metadata_address.as_deref(),
        Some("http://old-host:8080/realms/shop/.well-known/openid-configuration")
    );
    assert!(options.backchannel.is_some());

    resolve("Keycloak", &MapEnv::new(), &settings(), &mut options);
    let fresh = resolve_options(&MapEnv::new(), &settings());
    assert!(options.metadata_address.is_none());
    assert!(options.backchannel.is_none());
    assert_eq!(options.metadata_address, fresh.metadata_address);
    assert_eq!(options.authority, fresh.authority);
}

#[test]
fn test_remote_failure_redirects_to_error_page() {
    let options = resolve_options(&MapEnv::new(), &settings());

    let mut context = RemoteFailureContext::new(Some("access_denied"));
    options.events.remote_failure(&mut context);

    assert!(context.is_handled());
    assert_eq!(
        context.location(),
        Some("/identity/externalerrorcallback?provider=keycloak&errorMessage=access_denied")
    );
}

#[test]
fn test_debug_output_hides_client_secret() {
    let options = resolve_options(&MapEnv::new(), &settings());
    let out = format!("{options:?}");
    assert!(!out.contains("s3cret"));
    assert!(out.contains("storefront"));
}
