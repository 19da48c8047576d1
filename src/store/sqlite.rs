use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::{api_token, password};
use crate::config::NamingConfig;
use crate::db::models::{Post, PostDraft, Project, ProjectDraft, User};
use crate::db::{is_unique_violation, with_transaction};
use crate::naming;
use crate::state::DbPool;
use crate::store::sequence::next_post_id;
use crate::store::{JournalStore, StoreError, StoreResult};

/// SQLite implementation
pub struct SqliteJournalStore {
    pool: DbPool,
    naming: NamingConfig,
    bcrypt_cost: u32,
    /// Hash checked when a username is unknown, so a miss costs as much as a
    /// wrong password.
    dummy_hash: OnceLock<String>,
}

impl SqliteJournalStore {
    pub fn new(pool: DbPool, naming: NamingConfig, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            naming,
            bcrypt_cost,
            dummy_hash: OnceLock::new(),
        }
    }

    fn dummy_hash(&self) -> StoreResult<&str> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = password::hash_password("journal-no-such-user", self.bcrypt_cost)?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }
}

fn owned_project(conn: &Connection, owner_id: &str, name: &str) -> StoreResult<Option<Project>> {
    let sql = format!(
        "SELECT {} FROM projects WHERE user_id = ?1 AND name = ?2",
        Project::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![owner_id, name], Project::from_row)
        .optional()?)
}

fn post_in(conn: &Connection, project_id: &str, post_id: i64) -> StoreResult<Option<Post>> {
    let sql = format!(
        "SELECT {} FROM posts WHERE project_id = ?1 AND post_id = ?2",
        Post::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![project_id, post_id], Post::from_row)
        .optional()?)
}

fn name_taken(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM projects WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
}

fn insert_project(conn: &Connection, project: &Project) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO projects (id, user_id, name, title, body, private, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            project.id,
            project.user_id,
            project.name,
            project.title,
            project.body,
            project.private,
            project.created
        ],
    )?;
    Ok(())
}

#[async_trait]
impl JournalStore for SqliteJournalStore {
    async fn create_user(&self, username: &str, password: &str) -> StoreResult<User> {
        let hash = password::hash_password(password, self.bcrypt_cost)?;
        let user = User {
            id: uuid::Uuid::now_v7().to_string(),
            username: username.to_string(),
        };

        let conn = self.pool.get()?;
        match conn.execute(
            "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)",
            params![user.id, user.username, hash],
        ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Conflict(format!(
                    "user {} already exists",
                    username
                )))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(username = %user.username, "Created user");
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, hash)) if password::verify_password(password, &hash) => Ok(Some(User {
                id,
                username: username.to_string(),
            })),
            Some(_) => Ok(None),
            None => {
                password::verify_password(password, self.dummy_hash()?);
                Ok(None)
            }
        }
    }

    async fn user_by_name(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT id, username FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    async fn delete_user(&self, user_id: &str) -> StoreResult<()> {
        let (projects, posts) = with_transaction(&self.pool, |tx| -> StoreResult<_> {
            let posts = tx.execute(
                "DELETE FROM posts WHERE project_id IN (SELECT id FROM projects WHERE user_id = ?1)",
                params![user_id],
            )?;
            let projects = tx.execute("DELETE FROM projects WHERE user_id = ?1", params![user_id])?;
            tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
            if tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])? == 0 {
                return Err(StoreError::NotFound);
            }
            Ok((projects, posts))
        })?;

        tracing::info!(user_id, projects, posts, "Deleted user");
        Ok(())
    }

    async fn issue_api_token(&self, user_id: &str) -> StoreResult<String> {
        let token = api_token::generate_token();
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE users SET api_token_hash = ?1 WHERE id = ?2",
            params![api_token::token_digest(&token), user_id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(token)
    }

    async fn user_by_api_token(&self, token: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT id, username FROM users WHERE api_token_hash = ?1",
                params![api_token::token_digest(token)],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    async fn create_project(&self, owner_id: &str, draft: &ProjectDraft) -> StoreResult<Project> {
        let max_attempts = self.naming.max_attempts;

        let project = with_transaction(&self.pool, |tx| -> StoreResult<Project> {
            // One budget covers both the lookup and the insert race.
            let claimed = naming::claim_unique_name(
                max_attempts,
                |name| name_taken(tx, name),
                |name| {
                    let project = Project {
                        id: uuid::Uuid::now_v7().to_string(),
                        user_id: owner_id.to_string(),
                        name,
                        title: draft.title.clone(),
                        body: draft.body.clone(),
                        private: draft.private,
                        created: Utc::now(),
                        edited: None,
                    };
                    match insert_project(tx, &project) {
                        Ok(()) => Ok(Some(project)),
                        Err(e) if is_unique_violation(&e) => {
                            tracing::warn!(name = %project.name, "Project name taken at insert, retrying");
                            Ok(None)
                        }
                        Err(e) => Err(e),
                    }
                },
            )?;

            claimed.ok_or_else(|| {
                StoreError::Conflict(format!(
                    "no free project name after {} attempts",
                    max_attempts
                ))
            })
        })?;

        tracing::info!(name = %project.name, owner_id, "Created project");
        Ok(project)
    }

    async fn project(&self, owner_id: &str, name: &str) -> StoreResult<Option<Project>> {
        let conn = self.pool.get()?;
        owned_project(&conn, owner_id, name)
    }

    async fn list_projects(&self, owner_id: &str) -> StoreResult<Vec<Project>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = ?1 ORDER BY created DESC, rowid DESC",
            Project::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let projects = stmt
            .query_map(params![owner_id], Project::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    async fn update_project(
        &self,
        owner_id: &str,
        name: &str,
        draft: &ProjectDraft,
    ) -> StoreResult<Project> {
        with_transaction(&self.pool, |tx| -> StoreResult<Project> {
            let updated = tx.execute(
                "UPDATE projects SET title = ?1, body = ?2, private = ?3, edited = ?4
                 WHERE user_id = ?5 AND name = ?6",
                params![
                    draft.title,
                    draft.body,
                    draft.private,
                    Utc::now(),
                    owner_id,
                    name
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            owned_project(tx, owner_id, name)?.ok_or(StoreError::NotFound)
        })
    }

    async fn delete_project(&self, owner_id: &str, name: &str) -> StoreResult<()> {
        let posts = with_transaction(&self.pool, |tx| -> StoreResult<usize> {
            let project = owned_project(tx, owner_id, name)?.ok_or(StoreError::NotFound)?;
            let posts = tx.execute(
                "DELETE FROM posts WHERE project_id = ?1",
                params![project.id],
            )?;
            tx.execute("DELETE FROM projects WHERE id = ?1", params![project.id])?;
            Ok(posts)
        })?;

        tracing::info!(name, posts, "Deleted project");
        Ok(())
    }

    async fn create_post(
        &self,
        owner_id: &str,
        project_name: &str,
        draft: &PostDraft,
    ) -> StoreResult<Post> {
        let max_attempts = self.naming.max_attempts;

        let post = with_transaction(&self.pool, |tx| -> StoreResult<Post> {
            let project = owned_project(tx, owner_id, project_name)?.ok_or(StoreError::NotFound)?;

            // The counter normally cannot collide; a clash means post rows
            // were written around it, and drawing again skips past them.
            for _ in 0..max_attempts {
                let post = Post {
                    id: uuid::Uuid::now_v7().to_string(),
                    project_id: project.id.clone(),
                    post_id: next_post_id(tx, &project.id)?,
                    body: draft.body.clone(),
                    private: draft.private,
                    created: Utc::now(),
                    edited: None,
                };

                let inserted = tx.execute(
                    "INSERT INTO posts (id, project_id, post_id, body, private, created)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        post.id,
                        post.project_id,
                        post.post_id,
                        post.body,
                        post.private,
                        post.created
                    ],
                );
                match inserted {
                    Ok(_) => return Ok(post),
                    Err(e) if is_unique_violation(&e) => {
                        tracing::warn!(project = %project.name, post_id = post.post_id, "Post id taken, retrying");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(StoreError::Conflict(format!(
                "could not number post in {} after {} attempts",
                project.name, max_attempts
            )))
        })?;

        tracing::info!(project = project_name, post_id = post.post_id, "Created post");
        Ok(post)
    }

    async fn post(
        &self,
        owner_id: &str,
        project_name: &str,
        post_id: i64,
    ) -> StoreResult<Option<(Project, Post)>> {
        let conn = self.pool.get()?;
        let Some(project) = owned_project(&conn, owner_id, project_name)? else {
            return Ok(None);
        };
        Ok(post_in(&conn, &project.id, post_id)?.map(|post| (project, post)))
    }

    async fn list_posts(&self, project: &Project) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM posts WHERE project_id = ?1 ORDER BY post_id ASC",
            Post::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map(params![project.id], Post::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    async fn update_post(
        &self,
        owner_id: &str,
        project_name: &str,
        post_id: i64,
        draft: &PostDraft,
    ) -> StoreResult<Post> {
        with_transaction(&self.pool, |tx| -> StoreResult<Post> {
            let project = owned_project(tx, owner_id, project_name)?.ok_or(StoreError::NotFound)?;
            let updated = tx.execute(
                "UPDATE posts SET body = ?1, private = ?2, edited = ?3
                 WHERE project_id = ?4 AND post_id = ?5",
                params![draft.body, draft.private, Utc::now(), project.id, post_id],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            post_in(tx, &project.id, post_id)?.ok_or(StoreError::NotFound)
        })
    }

    async fn delete_post(
        &self,
        owner_id: &str,
        project_name: &str,
        post_id: i64,
    ) -> StoreResult<()> {
        with_transaction(&self.pool, |tx| -> StoreResult<()> {
            let project = owned_project(tx, owner_id, project_name)?.ok_or(StoreError::NotFound)?;
            let deleted = tx.execute(
                "DELETE FROM posts WHERE project_id = ?1 AND post_id = ?2",
                params![project.id, post_id],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })?;

        tracing::info!(project = project_name, post_id, "Deleted post");
        Ok(())
    }
}

impl SqliteJournalStore {
    /// Re-read a project by primary key, bypassing the owner scope. Only for
    /// checks that a row is really gone or unchanged.
    #[cfg(test)]
    fn raw_project(&self, id: &str) -> StoreResult<Option<Project>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", Project::COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Project::from_row)
            .optional()?)
    }
}
