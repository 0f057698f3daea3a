use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use keycloak_auth::defaults::{CALLBACK_PATH, ERROR_CALLBACK_PATH};
use keycloak_auth::{AuthenticationOptions, InMemorySettingsStore, KeycloakAuth, KeycloakRuntime};
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginQuery {
    return_url: Option<String>,
}

/// Sign-in page with the Keycloak button, when configured.
async fn login_page(
    State(keycloak): State<KeycloakRuntime>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    let button = keycloak
        .login_button(query.return_url.as_deref())
        .unwrap_or_else(|| "<p>Keycloak is not configured.</p>".to_string());
    Html(format!("<html><body><h1>Sign in</h1>{button}</body></html>"))
}

#[derive(Deserialize)]
struct CallbackQuery {
    error: Option<String>,
    error_description: Option<String>,
}

/// Stand-in for the OpenID Connect handler's callback: only the provider
/// error branch is simulated.
async fn signin_callback(
    State(keycloak): State<KeycloakRuntime>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let message = query.error_description.or(query.error);
    keycloak.remote_failure(message.as_deref())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorQuery {
    error_message: Option<String>,
}

async fn external_error(Query(query): Query<ErrorQuery>) -> Html<String> {
    let message = query.error_message.unwrap_or_default();
    Html(format!(
        "<html><body><h1>Login failed</h1><pre>{}</pre></body></html>",
        message.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    ))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,keycloak_auth=debug".into()),
        )
        .init();

    let base_url =
        std::env::var("DEMO_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/".to_string());

    let keycloak = KeycloakAuth::new()
        .store_base_url(base_url)
        .with_settings_store(InMemorySettingsStore::new())
        .build();

    let mut schemes = AuthenticationOptions::default();
    keycloak.configure_authentication(&mut schemes);
    for scheme in schemes.schemes() {
        info!(name = %scheme.name, display_name = %scheme.display_name, "Authentication scheme");
    }

    let app = Router::new()
        .route("/login", get(login_page))
        .route(CALLBACK_PATH, get(signin_callback))
        .route(ERROR_CALLBACK_PATH, get(external_error))
        .with_state(keycloak.clone())
        .merge(keycloak.router());

    let listener = match tokio::net::TcpListener::bind("0.0.0.0:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, "Failed to bind 0.0.0.0:3000");
            return;
        }
    };
    info!("Listening on http://0.0.0.0:3000");
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "Server error");
    }
}
