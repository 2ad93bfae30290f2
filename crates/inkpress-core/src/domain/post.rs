use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::FieldErrors;

/// Slugs a post can never take because they collide with fixed routes.
pub const RESERVED_SLUGS: &[&str] = &["comments"];

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

/// Post entity - represents a blog post or article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    /// Sorted and free of duplicates.
    pub tag_ids: Vec<Uuid>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub status: Option<String>,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub status: Option<String>,
}

impl Post {
    pub const TITLE_MAX_CHARS: usize = 100;

    /// Validate the input and create a post. Status defaults to draft.
    ///
    /// Whether the referenced author, category and tags exist is checked by
    /// the service, which has the store.
    pub fn new(input: NewPost) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.required_text("title", input.title, Some(Self::TITLE_MAX_CHARS));
        let slug = title.as_deref().and_then(|title| title_slug(&mut errors, title));
        let content = errors.required_text("content", input.content, None);
        let author_id = errors.required("author", input.author_id);
        let category_id = errors.required("category", input.category_id);
        let status = match input.status {
            Some(status) => parse_status(&mut errors, &status),
            None => Some(PostStatus::default()),
        };

        match (title, slug, content, author_id, category_id, status) {
            (
                Some(title),
                Some(slug),
                Some(content),
                Some(author_id),
                Some(category_id),
                Some(status),
            ) if errors.is_empty() => {
                let now = Utc::now();
                Ok(Self {
                    id: Uuid::new_v4(),
                    title,
                    slug,
                    content,
                    author_id,
                    category_id,
                    tag_ids: normalize_tags(input.tag_ids),
                    status,
                    created_at: now,
                    updated_at: now,
                })
            }
            _ => Err(errors),
        }
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// A title in the patch always re-derives the slug; nothing is changed when
    /// any field fails validation.
    pub fn apply(&mut self, patch: PostPatch) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = patch
            .title
            .and_then(|title| errors.text("title", title, Some(Self::TITLE_MAX_CHARS)));
        let slug = title.as_deref().and_then(|title| title_slug(&mut errors, title));
        let content = patch
            .content
            .and_then(|content| errors.text("content", content, None));
        let status = patch
            .status
            .and_then(|status| parse_status(&mut errors, &status));

        if !errors.is_empty() {
            return Err(errors);
        }

        if let (Some(title), Some(slug)) = (title, slug) {
            self.title = title;
            self.slug = slug;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(author_id) = patch.author_id {
            self.author_id = author_id;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(tag_ids) = patch.tag_ids {
            self.tag_ids = normalize_tags(tag_ids);
        }
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

fn title_slug(errors: &mut FieldErrors, title: &str) -> Option<String> {
    let slug = errors.derived_slug("title", title)?;
    if RESERVED_SLUGS.contains(&slug.as_str()) {
        errors.add("title", format!("The slug \"{slug}\" is reserved."));
        return None;
    }
    Some(slug)
}

fn parse_status(errors: &mut FieldErrors, value: &str) -> Option<PostStatus> {
    match value.parse() {
        Ok(status) => Some(status),
        Err(message) => {
            errors.add("status", message);
            None
        }
    }
}

fn normalize_tags(mut tag_ids: Vec<Uuid>) -> Vec<Uuid> {
    tag_ids.sort();
    tag_ids.dedup();
    tag_ids
}
