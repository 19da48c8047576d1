use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub title: String,
    pub body: String,
    pub private: bool,
    pub created: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub project_id: String,
    /// Position within the project, starting at 1.
    pub post_id: i64,
    pub body: String,
    pub private: bool,
    pub created: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
}

/// User-editable fields of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub body: String,
    pub private: bool,
}

/// User-editable fields of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub body: String,
    pub private: bool,
}

impl Project {
    pub(crate) const COLUMNS: &'static str =
        "id, user_id, name, title, body, private, created, edited";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            title: row.get(3)?,
            body: row.get(4)?,
            private: row.get(5)?,
            created: row.get(6)?,
            edited: row.get(7)?,
        })
    }
}

impl Post {
    pub(crate) const COLUMNS: &'static str =
        "id, project_id, post_id, body, private, created, edited";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            post_id: row.get(2)?,
            body: row.get(3)?,
            private: row.get(4)?,
            created: row.get(5)?,
            edited: row.get(6)?,
        })
    }
}
