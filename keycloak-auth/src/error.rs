use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::settings::SettingsError;

/// A field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Errors surfaced by the admin configure endpoints.
#[derive(Debug)]
pub enum KeycloakAuthError {
    /// The submitted configuration model is invalid. Nothing was saved.
    Validation(Vec<FieldError>),
    /// The settings store failed.
    Settings(SettingsError),
}

impl KeycloakAuthError {
    pub(crate) fn from_report(report: &garde::Report) -> Self {
        let errors = report
            .iter()
            .map(|(path, error)| {
                let field = path.to_string();
                FieldError {
                    field: if field.is_empty() { "value".into() } else { field },
                    message: error.message().to_string(),
                    code: "validation".into(),
                }
            })
            .collect();
        KeycloakAuthError::Validation(errors)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            KeycloakAuthError::Validation(_) => StatusCode::BAD_REQUEST,
            KeycloakAuthError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SettingsError> for KeycloakAuthError {
    fn from(err: SettingsError) -> Self {
        KeycloakAuthError::Settings(err)
    }
}

impl IntoResponse for KeycloakAuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            KeycloakAuthError::Validation(details) => serde_json::json!({
                "error": "Validation failed",
                "details": details,
            }),
            KeycloakAuthError::Settings(_) => serde_json::json!({
                "error": "Failed to save settings",
            }),
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for KeycloakAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeycloakAuthError::Validation(errors) => {
                write!(f, "Validation failed:")?;
                for error in errors {
                    write!(f, "\n  - {}: {}", error.field, error.message)?;
                }
                Ok(())
            }
            KeycloakAuthError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for KeycloakAuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeycloakAuthError::Settings(err) => Some(err),
            KeycloakAuthError::Validation(_) => None,
        }
    }
}
