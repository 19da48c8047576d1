use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::session;
use crate::error::AppResult;
use crate::extractors::{cookie_value, safe_next};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// GET /login: render login form, or skip it when already signed in
async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> AppResult<Response> {
    let next = safe_next(query.next.as_deref()).to_string();

    if let Some(token) = cookie_value(&headers, &state.config.auth.cookie_name) {
        if session::session_user(&state.db, token)?.is_some() {
            return Ok(Redirect::to(&next).into_response());
        }
    }

    Ok(Html(LoginTemplate {
        username: String::new(),
        next,
        error: None,
    })
    .into_response())
}

/// POST /login: check credentials and start a session
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let next = safe_next(form.next.as_deref()).to_string();
    let username = form.username.trim().to_string();

    let retry = |status: StatusCode, message: &str, username: String, next: String| {
        (
            status,
            Html(LoginTemplate {
                username,
                next,
                error: Some(message.to_string()),
            }),
        )
            .into_response()
    };

    if username.is_empty() || form.password.is_empty() {
        return Ok(retry(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Username and password are required",
            username,
            next,
        ));
    }

    let Some(user) = state.store.authenticate(&username, &form.password).await? else {
        tracing::info!(username = %username, "Failed login");
        return Ok(retry(
            StatusCode::UNAUTHORIZED,
            "Invalid username or password",
            username,
            next,
        ));
    };

    let hours = state.config.auth.session_hours;
    let token = session::create_session(&state.db, &user.id, hours)?;
    tracing::info!(username = %user.username, "Logged in");

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, next),
            (
                header::SET_COOKIE,
                session_cookie(&state.config.auth.cookie_name, &token, hours),
            ),
        ],
    )
        .into_response())
}

/// POST /logout: delete session and redirect
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = cookie_value(&headers, cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/login".to_string()),
            (header::SET_COOKIE, clear_session_cookie(cookie_name)),
        ],
    )
        .into_response())
}
