//! Redirects provider-side authentication failures to a local error page.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::defaults::{ERROR_CALLBACK_PATH, ERROR_CALLBACK_PROVIDER};
use crate::options::RemoteFailureHandler;

const UNKNOWN_ERROR: &str = "Unknown error";

/// State passed to the remote-failure callback.
///
/// The callback decides the response. Once [`handle_response`](Self::handle_response)
/// is called the host skips its default error propagation.
#[derive(Debug, Clone, Default)]
pub struct RemoteFailureContext {
    failure: Option<String>,
    location: Option<String>,
    handled: bool,
}

impl RemoteFailureContext {
    /// Context for a failure carrying `message`, or no message at all.
    pub fn new(failure: Option<impl Into<String>>) -> Self {
        Self {
            failure: failure.map(Into::into),
            location: None,
            handled: false,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Respond with a redirect to `location`.
    pub fn redirect(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    /// Mark the failure as handled.
    pub fn handle_response(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl IntoResponse for RemoteFailureContext {
    fn into_response(self) -> Response {
        match self.location {
            Some(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Local error page URL carrying `message` form-urlencoded.
pub fn error_callback_url(message: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("provider", ERROR_CALLBACK_PROVIDER)
        .append_pair("errorMessage", message)
        .finish();
    format!("{ERROR_CALLBACK_PATH}?{query}")
}

/// Redirect to the local error page and mark the failure handled.
pub fn redirect_on_remote_failure(context: &mut RemoteFailureContext) {
    let message = context.failure().unwrap_or(UNKNOWN_ERROR).to_string();
    warn!(error = %message, "Keycloak remote authentication failed");
    context.redirect(error_callback_url(&message));
    context.handle_response();
}

/// [`redirect_on_remote_failure`] as an installable event handler.
pub fn remote_failure_handler() -> RemoteFailureHandler {
    Arc::new(redirect_on_remote_failure)
}
