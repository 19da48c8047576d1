use serde::Deserialize;

use crate::db::models::{PostDraft, ProjectDraft};

pub const TITLE_MAX_CHARS: usize = 200;
pub const BODY_MAX_CHARS: usize = 20_000;

/// HTML checkboxes are absent when unticked and `"on"` when ticked.
fn checked(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub private: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub body: String,
    pub private: Option<String>,
}

/// Field-level messages shown next to the form inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

fn check_body(body: &str, required: bool) -> Option<String> {
    if required && body.trim().is_empty() {
        Some("Write something first".to_string())
    } else if body.chars().count() > BODY_MAX_CHARS {
        Some(format!("Keep it under {} characters", BODY_MAX_CHARS))
    } else {
        None
    }
}

impl ProjectForm {
    pub fn from_project(project: &crate::db::models::Project) -> Self {
        Self {
            title: project.title.clone(),
            body: project.body.clone(),
            private: project.private.then(|| "on".to_string()),
        }
    }

    pub fn is_private(&self) -> bool {
        checked(&self.private)
    }

    pub fn validate(&self) -> Result<ProjectDraft, FieldErrors> {
        let title = self.title.trim();
        let errors = FieldErrors {
            title: if title.is_empty() {
                Some("Title is required".to_string())
            } else if title.chars().count() > TITLE_MAX_CHARS {
                Some(format!("Keep the title under {} characters", TITLE_MAX_CHARS))
            } else {
                None
            },
            body: check_body(&self.body, false),
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ProjectDraft {
            title: title.to_string(),
            body: self.body.clone(),
            private: self.is_private(),
        })
    }
}

impl PostForm {
    pub fn from_post(post: &crate::db::models::Post) -> Self {
        Self {
            body: post.body.clone(),
            private: post.private.then(|| "on".to_string()),
        }
    }

    pub fn is_private(&self) -> bool {
        checked(&self.private)
    }

    pub fn validate(&self) -> Result<PostDraft, FieldErrors> {
        if let Some(message) = check_body(&self.body, true) {
            return Err(FieldErrors {
                title: None,
                body: Some(message),
            });
        }
        Ok(PostDraft {
            body: self.body.clone(),
            private: self.is_private(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_title_is_trimmed_and_required() {
        let form = ProjectForm {
            title: "  Garden  ".into(),
            body: String::new(),
            private: None,
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.title, "Garden");
        assert!(!draft.private);

        let blank = ProjectForm {
            title: "   ".into(),
            ..Default::default()
        };
        let errors = blank.validate().unwrap_err();
        assert!(errors.title.is_some());
        assert!(errors.body.is_none());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let form = ProjectForm {
            title: "x".repeat(TITLE_MAX_CHARS + 1),
            body: "y".repeat(BODY_MAX_CHARS + 1),
            private: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.title.is_some());
        assert!(errors.body.is_some());
    }

    #[test]
    fn checkbox_sets_private() {
        let form = PostForm {
            body: "hello".into(),
            private: Some("on".into()),
        };
        assert!(form.validate().unwrap().private);
    }

    #[test]
    fn post_body_is_required() {
        let form = PostForm {
            body: "\n  ".into(),
            private: None,
        };
        assert!(form.validate().unwrap_err().body.is_some());
    }
}
