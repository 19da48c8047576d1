// Repository pattern - all reads and writes of users, projects and posts
pub mod sequence;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::{Post, PostDraft, Project, ProjectDraft, User};

pub use sqlite::SqliteJournalStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every lookup is scoped by the owning user's id. A project that belongs to
/// someone else is reported exactly like one that does not exist.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Create a user with a freshly hashed password
    async fn create_user(&self, username: &str, password: &str) -> StoreResult<User>;

    /// Look up a user by name and check their password
    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<Option<User>>;

    async fn user_by_name(&self, username: &str) -> StoreResult<Option<User>>;

    /// Remove a user and everything they own in one transaction
    async fn delete_user(&self, user_id: &str) -> StoreResult<()>;

    /// Replace the user's API token; the plaintext is only ever returned here
    async fn issue_api_token(&self, user_id: &str) -> StoreResult<String>;

    async fn user_by_api_token(&self, token: &str) -> StoreResult<Option<User>>;

    async fn create_project(&self, owner_id: &str, draft: &ProjectDraft) -> StoreResult<Project>;

    async fn project(&self, owner_id: &str, name: &str) -> StoreResult<Option<Project>>;

    /// Newest first
    async fn list_projects(&self, owner_id: &str) -> StoreResult<Vec<Project>>;

    async fn update_project(
        &self,
        owner_id: &str,
        name: &str,
        draft: &ProjectDraft,
    ) -> StoreResult<Project>;

    /// Delete a project and all of its posts atomically
    async fn delete_project(&self, owner_id: &str, name: &str) -> StoreResult<()>;

    /// Append a post, numbering it after the project's previous posts
    async fn create_post(
        &self,
        owner_id: &str,
        project_name: &str,
        draft: &PostDraft,
    ) -> StoreResult<Post>;

    async fn post(
        &self,
        owner_id: &str,
        project_name: &str,
        post_id: i64,
    ) -> StoreResult<Option<(Project, Post)>>;

    /// Ascending `post_id`
    async fn list_posts(&self, project: &Project) -> StoreResult<Vec<Post>>;

    async fn update_post(
        &self,
        owner_id: &str,
        project_name: &str,
        post_id: i64,
        draft: &PostDraft,
    ) -> StoreResult<Post>;

    async fn delete_post(&self, owner_id: &str, project_name: &str, post_id: i64)
        -> StoreResult<()>;
}

/// Type alias for Arc-wrapped store (for AppState)
pub type DynJournalStore = Arc<dyn JournalStore>;
