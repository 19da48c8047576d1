use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::forms::{FieldErrors, PostForm};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/post_form.html")]
pub struct PostFormTemplate {
    pub username: String,
    pub heading: String,
    pub action: String,
    pub project_name: String,
    pub project_title: String,
    pub form: PostForm,
    pub errors: FieldErrors,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{name}/posts/new", get(new_post).post(create_post))
        .route(
            "/projects/{name}/posts/{id}/edit",
            get(edit_post).post(update_post),
        )
        .route("/projects/{name}/posts/{id}/delete", post(delete_post))
}

struct FormContext {
    username: String,
    project_name: String,
    project_title: String,
    post_id: Option<i64>,
}

fn form_page(
    status: StatusCode,
    ctx: FormContext,
    form: PostForm,
    errors: FieldErrors,
) -> Response {
    let (heading, action) = match ctx.post_id {
        Some(id) => (
            format!("Edit post #{}", id),
            format!("/projects/{}/posts/{}/edit", ctx.project_name, id),
        ),
        None => (
            "New post".to_string(),
            format!("/projects/{}/posts/new", ctx.project_name),
        ),
    };
    (
        status,
        Html(PostFormTemplate {
            username: ctx.username,
            heading,
            action,
            project_name: ctx.project_name,
            project_title: ctx.project_title,
            form,
            errors,
        }),
    )
        .into_response()
}

/// GET /projects/{name}/posts/new: new posts start private, like projects
async fn new_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let project = state
        .store
        .project(&user.id, &name)
        .await?
        .ok_or(AppError::NotFound)?;

    let form = PostForm {
        body: String::new(),
        private: Some("on".to_string()),
    };
    let ctx = FormContext {
        username: user.username,
        project_name: project.name,
        project_title: project.title,
        post_id: None,
    };
    Ok(form_page(StatusCode::OK, ctx, form, FieldErrors::default()))
}

/// POST /projects/{name}/posts/new
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            let project = state
                .store
                .project(&user.id, &name)
                .await?
                .ok_or(AppError::NotFound)?;
            let ctx = FormContext {
                username: user.username,
                project_name: project.name,
                project_title: project.title,
                post_id: None,
            };
            return Ok(form_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                ctx,
                form,
                errors,
            ));
        }
    };

    let post = state.store.create_post(&user.id, &name, &draft).await?;
    Ok(Redirect::to(&format!("/projects/{}/posts/{}", name, post.post_id)).into_response())
}

/// GET /projects/{name}/posts/{id}/edit
async fn edit_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((name, id)): Path<(String, i64)>,
) -> AppResult<Response> {
    let (project, post) = state
        .store
        .post(&user.id, &name, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let ctx = FormContext {
        username: user.username,
        project_name: project.name,
        project_title: project.title,
        post_id: Some(post.post_id),
    };
    Ok(form_page(
        StatusCode::OK,
        ctx,
        PostForm::from_post(&post),
        FieldErrors::default(),
    ))
}

/// POST /projects/{name}/posts/{id}/edit
async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((name, id)): Path<(String, i64)>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            let (project, post) = state
                .store
                .post(&user.id, &name, id)
                .await?
                .ok_or(AppError::NotFound)?;
            let ctx = FormContext {
                username: user.username,
                project_name: project.name,
                project_title: project.title,
                post_id: Some(post.post_id),
            };
            return Ok(form_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                ctx,
                form,
                errors,
            ));
        }
    };

    let post = state.store.update_post(&user.id, &name, id, &draft).await?;
    Ok(Redirect::to(&format!("/projects/{}/posts/{}", name, post.post_id)).into_response())
}

/// POST /projects/{name}/posts/{id}/delete: the id is never handed out again
async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((name, id)): Path<(String, i64)>,
) -> AppResult<Redirect> {
    state.store.delete_post(&user.id, &name, id).await?;
    Ok(Redirect::to(&format!("/projects/{}", name)))
}
