use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::session;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in user behind a browser request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Rejection for [`CurrentUser`]: send the browser to the login form and
/// bring it back afterwards.
pub enum AuthRedirect {
    Login { next: String },
    Error(AppError),
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        match self {
            AuthRedirect::Login { next } => Redirect::to(&login_url(&next)).into_response(),
            AuthRedirect::Error(e) => e.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let Some(token) = cookie_value(&parts.headers, &state.config.auth.cookie_name) else {
            return Err(AuthRedirect::Login { next });
        };

        match session::session_user(&state.db, token) {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(AuthRedirect::Login { next }),
            Err(e) => Err(AuthRedirect::Error(e.into())),
        }
    }
}

/// The owner scope for API requests.
///
/// Accepts `Authorization: Bearer <api token>` first and falls back to the
/// browser session cookie. Anything else is a 401.
#[derive(Debug, Clone)]
pub struct ApiCaller(pub User);

impl FromRequestParts<AppState> for ApiCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(&parts.headers) {
            return match state.store.user_by_api_token(token).await? {
                Some(user) => Ok(ApiCaller(user)),
                None => {
                    tracing::debug!("Rejected unknown API token");
                    Err(AppError::Unauthorized)
                }
            };
        }

        let token = cookie_value(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;
        session::session_user(&state.db, token)?
            .map(ApiCaller)
            .ok_or(AppError::Unauthorized)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

pub fn login_url(next: &str) -> String {
    if next == "/" {
        return "/login".to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("/login?{}", query)
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}
