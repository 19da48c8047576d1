use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use crate::db::models::{Post, Project};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::format::format_age;
use crate::routes::forms::{FieldErrors, ProjectForm};
use crate::routes::home::Html;
use crate::routes::markdown::render_markdown;
use crate::state::AppState;
use crate::visibility::{latest_visible, post_visible, project_visible, Viewer};

pub struct ProjectView {
    pub name: String,
    pub title: String,
    /// Sanitised HTML rendered from the Markdown body
    pub body_html: String,
    pub private: bool,
    pub created: String,
    pub edited: Option<String>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            title: project.title.clone(),
            body_html: render_markdown(&project.body),
            private: project.private,
            created: format_age(&project.created),
            edited: project.edited.as_ref().map(format_age),
        }
    }
}

pub struct PostView {
    pub post_id: i64,
    pub body_html: String,
    pub private: bool,
    pub created: String,
    pub edited: Option<String>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            post_id: post.post_id,
            body_html: render_markdown(&post.body),
            private: post.private,
            created: format_age(&post.created),
            edited: post.edited.as_ref().map(format_age),
        }
    }
}

/// Entry in the post navigation list.
pub struct PostLink {
    pub post_id: i64,
    pub private: bool,
    pub current: bool,
}

#[derive(Template)]
#[template(path = "pages/project.html")]
pub struct ProjectTemplate {
    pub username: String,
    pub project: ProjectView,
    pub posts: Vec<PostLink>,
    pub current: Option<PostView>,
}

#[derive(Template)]
#[template(path = "pages/project_form.html")]
pub struct ProjectFormTemplate {
    pub username: String,
    pub heading: String,
    pub action: String,
    /// Set when editing; links back to the project.
    pub name: Option<String>,
    pub form: ProjectForm,
    pub errors: FieldErrors,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/new", get(new_project).post(create_project))
        .route("/projects/{name}", get(show_project))
        .route("/projects/{name}/posts/{id}", get(show_post))
        .route("/projects/{name}/edit", get(edit_project).post(update_project))
        .route("/projects/{name}/delete", post(delete_project))
}

async fn render_project(
    state: &AppState,
    username: String,
    viewer: &Viewer,
    project: &Project,
    selected: Option<i64>,
) -> AppResult<Html<ProjectTemplate>> {
    if !project_visible(project, viewer) {
        return Err(AppError::NotFound);
    }

    let posts = state.store.list_posts(project).await?;
    let visible: Vec<Post> = posts
        .into_iter()
        .filter(|p| post_visible(project, p, viewer))
        .collect();

    let current = match selected {
        Some(id) => Some(
            visible
                .iter()
                .find(|p| p.post_id == id)
                .ok_or(AppError::NotFound)?,
        ),
        None => latest_visible(project, &visible, viewer),
    };
    let current_id = current.map(|p| p.post_id);

    Ok(Html(ProjectTemplate {
        username,
        project: ProjectView::from(project),
        posts: visible
            .iter()
            .map(|p| PostLink {
                post_id: p.post_id,
                private: p.private,
                current: Some(p.post_id) == current_id,
            })
            .collect(),
        current: current.map(PostView::from),
    }))
}

fn form_page(
    status: StatusCode,
    username: String,
    name: Option<String>,
    form: ProjectForm,
    errors: FieldErrors,
) -> Response {
    let (heading, action) = match &name {
        Some(n) => ("Edit project".to_string(), format!("/projects/{}/edit", n)),
        None => ("New project".to_string(), "/projects/new".to_string()),
    };
    (
        status,
        Html(ProjectFormTemplate {
            username,
            heading,
            action,
            name,
            form,
            errors,
        }),
    )
        .into_response()
}

/// GET /projects/new
async fn new_project(CurrentUser(user): CurrentUser) -> Response {
    let form = ProjectForm {
        private: Some("on".to_string()),
        ..Default::default()
    };
    form_page(StatusCode::OK, user.username, None, form, FieldErrors::default())
}

/// POST /projects/new: store under a generated name and open it
async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ProjectForm>,
) -> AppResult<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(form_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                user.username,
                None,
                form,
                errors,
            ))
        }
    };

    let project = state.store.create_project(&user.id, &draft).await?;
    Ok(Redirect::to(&format!("/projects/{}", project.name)).into_response())
}

/// GET /projects/{name}: the project with its newest post
async fn show_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Html<ProjectTemplate>> {
    let project = state
        .store
        .project(&user.id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    let viewer = Viewer::Owner(user.id);
    render_project(&state, user.username, &viewer, &project, None).await
}

/// GET /projects/{name}/posts/{id}
async fn show_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((name, id)): Path<(String, i64)>,
) -> AppResult<Html<ProjectTemplate>> {
    let project = state
        .store
        .project(&user.id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    let viewer = Viewer::Owner(user.id);
    render_project(&state, user.username, &viewer, &project, Some(id)).await
}

/// GET /projects/{name}/edit
async fn edit_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let project = state
        .store
        .project(&user.id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(form_page(
        StatusCode::OK,
        user.username,
        Some(project.name.clone()),
        ProjectForm::from_project(&project),
        FieldErrors::default(),
    ))
}

/// POST /projects/{name}/edit
async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
    Form(form): Form<ProjectForm>,
) -> AppResult<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(form_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                user.username,
                Some(name),
                form,
                errors,
            ))
        }
    };

    let project = state.store.update_project(&user.id, &name, &draft).await?;
    Ok(Redirect::to(&format!("/projects/{}", project.name)).into_response())
}

/// POST /projects/{name}/delete: removes the project and every post in it
async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Redirect> {
    state.store.delete_project(&user.id, &name).await?;
    Ok(Redirect::to("/"))
}
