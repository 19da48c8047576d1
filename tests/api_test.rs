//! End-to-end tests for the read-only JSON API.
//!
//! Each test builds the full router over a fresh database in a temp dir and
//! drives it with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use journal::config::Config;
use journal::db;
use journal::db::models::{PostDraft, ProjectDraft, User};
use journal::routes;
use journal::state::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup() -> (TempDir, AppState) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let mut config = Config::default();
    config.database.path = Some(db_path);
    config.auth.bcrypt_cost = 4;
    (temp_dir, AppState::new(pool, config))
}

async fn user_with_token(state: &AppState, username: &str) -> (User, String) {
    let user = state.store.create_user(username, "hunter22").await.unwrap();
    let token = state.store.issue_api_token(&user.id).await.unwrap();
    (user, token)
}

fn project_draft(title: &str, private: bool) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        body: format!("{} body", title),
        private,
    }
}

fn post_draft(body: &str, private: bool) -> PostDraft {
    PostDraft {
        body: body.to_string(),
        private,
    }
}

async fn get(state: &AppState, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = routes::app(state.clone())
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_public_project_then_post_then_private() {
    let (_dir, state) = setup();
    let (user, token) = user_with_token(&state, "ada").await;
    let project = state
        .store
        .create_project(&user.id, &project_draft("Garden", false))
        .await
        .unwrap();

    let project_uri = format!("/api/project?name={}", project.name);
    let (status, json) = get(&state, &project_uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], project.name.as_str());
    assert_eq!(json["data"]["title"], "Garden");
    assert_eq!(json["data"]["uri"], project_uri.as_str());
    assert!(json["data"]["post"].is_null());

    state
        .store
        .create_post(&user.id, &project.name, &post_draft("hello", false))
        .await
        .unwrap();

    let post_uri = format!("/api/post?name={}&id=1", project.name);
    let (status, json) = get(&state, &post_uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["post"]["post_id"], 1);
    assert_eq!(json["data"]["post"]["body"], "hello");

    let (_, json) = get(&state, &project_uri, Some(&token)).await;
    assert_eq!(json["data"]["post"]["body"], "hello");

    state
        .store
        .update_project(&user.id, &project.name, &project_draft("Garden", true))
        .await
        .unwrap();

    let (status, _) = get(&state, &project_uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&state, &post_uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_latest_post_skips_private_posts() {
    let (_dir, state) = setup();
    let (user, token) = user_with_token(&state, "ada").await;
    let project = state
        .store
        .create_project(&user.id, &project_draft("Bench", false))
        .await
        .unwrap();
    for (body, private) in [("first", false), ("second", false), ("draft", true)] {
        state
            .store
            .create_post(&user.id, &project.name, &post_draft(body, private))
            .await
            .unwrap();
    }

    let (status, json) = get(
        &state,
        &format!("/api/project?name={}", project.name),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["post"]["post_id"], 2);
    assert_eq!(json["data"]["post"]["body"], "second");

    // The private post is hidden even when asked for directly
    let (status, _) = get(
        &state,
        &format!("/api/post?name={}&id=3", project.name),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_projects_lists_only_public_newest_first() {
    let (_dir, state) = setup();
    let (user, token) = user_with_token(&state, "ada").await;
    let first = state
        .store
        .create_project(&user.id, &project_draft("First", false))
        .await
        .unwrap();
    state
        .store
        .create_project(&user.id, &project_draft("Hidden", true))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = state
        .store
        .create_project(&user.id, &project_draft("Second", false))
        .await
        .unwrap();

    let (status, json) = get(&state, "/api/projects", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![second.name.as_str(), first.name.as_str()]);
}

#[tokio::test]
async fn test_missing_or_malformed_params_are_400() {
    let (_dir, state) = setup();
    let (user, token) = user_with_token(&state, "ada").await;
    let project = state
        .store
        .create_project(&user.id, &project_draft("Garden", false))
        .await
        .unwrap();

    let cases = [
        "/api/project".to_string(),
        format!("/api/post?name={}", project.name),
        "/api/post?id=1".to_string(),
        format!("/api/post?name={}&id=one", project.name),
    ];
    for uri in cases {
        let (status, _) = get(&state, &uri, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_project_and_post_are_404() {
    let (_dir, state) = setup();
    let (user, token) = user_with_token(&state, "ada").await;
    let project = state
        .store
        .create_project(&user.id, &project_draft("Garden", false))
        .await
        .unwrap();

    let (status, _) = get(&state, "/api/project?name=NoSuchName", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(
        &state,
        &format!("/api/post?name={}&id=9", project.name),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_requests_without_valid_credentials_are_401() {
    let (_dir, state) = setup();
    user_with_token(&state, "ada").await;

    let (status, _) = get(&state, "/api/projects", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = get(&state, "/api/projects", Some("not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_other_users_projects_are_404() {
    let (_dir, state) = setup();
    let (owner, _) = user_with_token(&state, "ada").await;
    let (_, other_token) = user_with_token(&state, "grace").await;
    let project = state
        .store
        .create_project(&owner.id, &project_draft("Garden", false))
        .await
        .unwrap();
    state
        .store
        .create_post(&owner.id, &project.name, &post_draft("hello", false))
        .await
        .unwrap();

    let (status, _) = get(
        &state,
        &format!("/api/project?name={}", project.name),
        Some(&other_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(
        &state,
        &format!("/api/post?name={}&id=1", project.name),
        Some(&other_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = get(&state, "/api/projects", Some(&other_token)).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reissued_token_replaces_the_old_one() {
    let (_dir, state) = setup();
    let (user, old_token) = user_with_token(&state, "ada").await;
    let new_token = state.store.issue_api_token(&user.id).await.unwrap();

    let (status, _) = get(&state, "/api/projects", Some(&old_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = get(&state, "/api/projects", Some(&new_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_project_posts_are_gone() {
    let (_dir, state) = setup();
    let (user, token) = user_with_token(&state, "ada").await;
    let project = state
        .store
        .create_project(&user.id, &project_draft("Garden", false))
        .await
        .unwrap();
    state
        .store
        .create_post(&user.id, &project.name, &post_draft("hello", false))
        .await
        .unwrap();

    state
        .store
        .delete_project(&user.id, &project.name)
        .await
        .unwrap();

    let (status, _) = get(
        &state,
        &format!("/api/post?name={}&id=1", project.name),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
