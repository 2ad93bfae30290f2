use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::FieldErrors;

/// Comment entity - a reader's comment on a post, optionally replying to another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    /// Free-text display name, not a reference to [`Author`](super::Author).
    pub author: String,
    pub author_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub post_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub content: Option<String>,
}

impl Comment {
    pub const AUTHOR_MAX_CHARS: usize = 255;

    /// Validate the input fields.
    ///
    /// The post, the parent and the nesting depth are checked against the
    /// store by the comment service.
    pub fn new(input: NewComment) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let post_id = errors.required("post", input.post_id);
        let author = errors.required_text("author", input.author, Some(Self::AUTHOR_MAX_CHARS));
        let author_email = errors.required_email("author_email", input.author_email);
        let content = errors.required_text("content", input.content, None);

        match (post_id, author, author_email, content) {
            (Some(post_id), Some(author), Some(author_email), Some(content))
                if errors.is_empty() =>
            {
                Ok(Self {
                    id: Uuid::new_v4(),
                    post_id,
                    parent_id: input.parent_id,
                    author,
                    author_email,
                    content,
                    created_at: Utc::now(),
                })
            }
            _ => Err(errors),
        }
    }
}
