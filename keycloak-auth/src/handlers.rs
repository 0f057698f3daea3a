use axum::extract::{FromRequest, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::debug;

use crate::admin::{ConfigurationModel, ConfigurePage};
use crate::error::KeycloakAuthError;
use crate::KeycloakRuntime;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScopeQuery {
    #[serde(default)]
    pub store_scope: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginQuery {
    pub return_url: Option<String>,
}

/// Configure page submission, posted either as a form or as JSON.
pub(crate) struct ConfigurationBody(pub ConfigurationModel);

impl<S> FromRequest<S> for ConfigurationBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(model) = Form::<ConfigurationModel>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(model))
        } else {
            let Json(model) = Json::<ConfigurationModel>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(model))
        }
    }
}

/// GET {admin}/configure
pub(crate) async fn configure_page(
    State(runtime): State<KeycloakRuntime>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ConfigurePage>, KeycloakAuthError> {
    let page = runtime.admin().configure_page(query.store_scope)?;
    Ok(Json(page))
}

/// POST {admin}/configure
pub(crate) async fn save_configuration(
    State(runtime): State<KeycloakRuntime>,
    Query(query): Query<ScopeQuery>,
    ConfigurationBody(model): ConfigurationBody,
) -> Result<Redirect, KeycloakAuthError> {
    debug!(store_scope = query.store_scope, ?model, "Saving Keycloak configuration");
    runtime.admin().save(query.store_scope, model)?;
    Ok(Redirect::to(&format!(
        "{}?storeScope={}",
        runtime.configure_path(),
        query.store_scope
    )))
}

/// GET /keycloak/login-button
pub(crate) async fn login_button(
    State(runtime): State<KeycloakRuntime>,
    Query(query): Query<LoginQuery>,
) -> Response {
    match runtime.login_button(query.return_url.as_deref()) {
        Some(html) => Html(html).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
