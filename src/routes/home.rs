use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::models::Project;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::routes::format::format_age;
use crate::state::AppState;
use crate::visibility::{project_visible, Viewer};

/// One row of the project list.
pub struct ProjectSummary {
    pub name: String,
    pub title: String,
    pub private: bool,
    pub created: String,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            title: project.title.clone(),
            private: project.private,
            created: format_age(&project.created),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub username: String,
    pub projects: Vec<ProjectSummary>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// GET /: the signed-in user's projects, newest first
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<IndexTemplate>> {
    let viewer = Viewer::Owner(user.id.clone());
    let projects = state
        .store
        .list_projects(&user.id)
        .await?
        .iter()
        .filter(|p| project_visible(p, &viewer))
        .map(ProjectSummary::from)
        .collect();

    Ok(Html(IndexTemplate {
        username: user.username,
        projects,
    }))
}
