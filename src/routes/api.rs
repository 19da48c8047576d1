//! Read-only JSON view of a user's journal.
//!
//! Every handler evaluates visibility as [`Viewer::Public`], so the API only
//! ever exposes what the owner has published, even to the owner.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Post, Project};
use crate::error::{AppError, AppResult};
use crate::extractors::ApiCaller;
use crate::state::AppState;
use crate::visibility::{latest_visible, post_visible, project_visible, Viewer};

/// Response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiProject {
    pub name: String,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiPost {
    pub post_id: i64,
    pub body: String,
    pub created: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiProjectWithPost {
    #[serde(flatten)]
    pub project: ApiProject,
    pub post: Option<ApiPost>,
}

impl From<&Project> for ApiProject {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            title: project.title.clone(),
            body: project.body.clone(),
            created: project.created,
            edited: project.edited,
            uri: project_uri(&project.name),
        }
    }
}

impl From<&Post> for ApiPost {
    fn from(post: &Post) -> Self {
        Self {
            post_id: post.post_id,
            body: post.body.clone(),
            created: post.created,
            edited: post.edited,
        }
    }
}

pub fn project_uri(name: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .finish();
    format!("/api/project?{}", query)
}

// Parameters are optional here; handlers answer a missing one with 400.
#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub name: Option<String>,
    pub id: Option<String>,
}

fn required<'a>(value: &'a Option<String>, param: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("missing parameter: {}", param)))
}

fn parse_post_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid post id: {}", raw)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/project", get(get_project))
        .route("/api/post", get(get_post))
}

/// GET /api/projects
async fn list_projects(
    State(state): State<AppState>,
    ApiCaller(user): ApiCaller,
) -> AppResult<Json<Data<Vec<ApiProject>>>> {
    let projects = state
        .store
        .list_projects(&user.id)
        .await?
        .iter()
        .filter(|p| project_visible(p, &Viewer::Public))
        .map(ApiProject::from)
        .collect();
    Ok(Json(Data { data: projects }))
}

async fn public_project(state: &AppState, owner_id: &str, name: &str) -> AppResult<Project> {
    state
        .store
        .project(owner_id, name)
        .await?
        .filter(|p| project_visible(p, &Viewer::Public))
        .ok_or(AppError::NotFound)
}

/// GET /api/project?name=<name>: the project with its newest public post
async fn get_project(
    State(state): State<AppState>,
    ApiCaller(user): ApiCaller,
    Query(query): Query<ProjectQuery>,
) -> AppResult<Json<Data<ApiProjectWithPost>>> {
    let name = required(&query.name, "name")?;
    let project = public_project(&state, &user.id, name).await?;
    let posts = state.store.list_posts(&project).await?;
    let post = latest_visible(&project, &posts, &Viewer::Public).map(ApiPost::from);

    Ok(Json(Data {
        data: ApiProjectWithPost {
            project: ApiProject::from(&project),
            post,
        },
    }))
}

/// GET /api/post?name=<name>&id=<post_id>
async fn get_post(
    State(state): State<AppState>,
    ApiCaller(user): ApiCaller,
    Query(query): Query<PostQuery>,
) -> AppResult<Json<Data<ApiProjectWithPost>>> {
    let name = required(&query.name, "name")?;
    let post_id = parse_post_id(required(&query.id, "id")?)?;

    let (project, post) = state
        .store
        .post(&user.id, name, post_id)
        .await?
        .filter(|(project, post)| post_visible(project, post, &Viewer::Public))
        .ok_or(AppError::NotFound)?;

    Ok(Json(Data {
        data: ApiProjectWithPost {
            project: ApiProject::from(&project),
            post: Some(ApiPost::from(&post)),
        },
    }))
}
