//! Who may see which projects and posts.
//!
//! Every read path goes through [`is_visible`]: web pages ask as the
//! signed-in owner, the JSON API always asks as [`Viewer::Public`] even when
//! the caller owns the data.

use crate::db::models::{Post, Project};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// The signed-in user with this id.
    Owner(String),
    /// Anonymous readers and API consumers.
    Public,
}

#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Project(&'a Project),
    Post {
        project: &'a Project,
        post: &'a Post,
    },
}

impl Viewer {
    fn owns(&self, project: &Project) -> bool {
        matches!(self, Viewer::Owner(id) if *id == project.user_id)
    }
}

pub fn is_visible(entity: Entity<'_>, viewer: &Viewer) -> bool {
    match entity {
        Entity::Project(project) => viewer.owns(project) || !project.private,
        Entity::Post { project, post } => {
            debug_assert_eq!(post.project_id, project.id);
            viewer.owns(project) || (!project.private && !post.private)
        }
    }
}

pub fn project_visible(project: &Project, viewer: &Viewer) -> bool {
    is_visible(Entity::Project(project), viewer)
}

pub fn post_visible(project: &Project, post: &Post, viewer: &Viewer) -> bool {
    is_visible(Entity::Post { project, post }, viewer)
}

/// The newest post of `project` that `viewer` may see. `posts` must be in
/// ascending `post_id` order.
pub fn latest_visible<'a>(project: &Project, posts: &'a [Post], viewer: &Viewer) -> Option<&'a Post> {
    posts
        .iter()
        .rev()
        .find(|post| post_visible(project, post, viewer))
}
