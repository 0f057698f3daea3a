//! Login button shown on the host's sign-in page.

use crate::defaults::{AUTHENTICATION_SCHEME, EXTERNAL_LOGIN_PATH};
use crate::options::OpenIdConnectOptions;

/// Default button caption.
pub const DEFAULT_TITLE: &str = "Log in with Keycloak";

/// Renders the Keycloak login button.
#[derive(Debug, Clone)]
pub struct LoginButton {
    title: String,
}

impl LoginButton {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Use a localized caption.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// HTML fragment for the button, or `None` when the provider is not
    /// fully configured.
    ///
    /// `return_url` is carried over to the external-login link.
    pub fn render(&self, options: &OpenIdConnectOptions, return_url: Option<&str>) -> Option<String> {
        if !options.is_configured() {
            return None;
        }

        let href = external_login_url(return_url);
        Some(format!(
            "<a class='btn btn-primary btn-block btn-lg btn-extauth btn-brand-keycloak' href='{}' rel='nofollow'>\
             <i class='fas fa-fw fa-lg fa-key' aria-hidden='true'></i><span>{}</span></a>",
            escape_html(&href),
            escape_html(&self.title)
        ))
    }
}

impl Default for LoginButton {
    fn default() -> Self {
        Self::new()
    }
}

/// Host external-login URL for the Keycloak scheme.
///
/// An empty or missing `return_url` is left off the query.
pub fn external_login_url(return_url: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("provider", AUTHENTICATION_SCHEME);
    if let Some(return_url) = return_url.filter(|u| !u.is_empty()) {
        query.append_pair("returnUrl", return_url);
    }
    format!("{EXTERNAL_LOGIN_PATH}?{}", query.finish())
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_without_return_url() {
        assert_eq!(external_login_url(None), "/identity/externallogin?provider=Keycloak");
        assert_eq!(external_login_url(Some("")), "/identity/externallogin?provider=Keycloak");
    }

    #[test]
    fn login_url_encodes_return_url() {
        assert_eq!(
            external_login_url(Some("/cart?step=2")),
            "/identity/externallogin?provider=Keycloak&returnUrl=%2Fcart%3Fstep%3D2"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a&b<c>'\""), "a&amp;b&lt;c&gt;&#39;&quot;");
    }
}
