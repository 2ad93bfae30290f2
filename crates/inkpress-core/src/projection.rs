//! Read models: entities together with snapshots of related records and derived counts.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Author, Category, Post, Tag};
use crate::error::DomainError;
use crate::ports::Repositories;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub category: Category,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagView {
    pub tag: Tag,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub author: Author,
    pub category: CategoryView,
    pub tags: Vec<TagView>,
    pub comments_count: u64,
}

/// Builds views on demand; counts are read per call and never cached.
#[derive(Clone)]
pub struct Projector {
    repos: Repositories,
}

impl Projector {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn category(&self, category: Category) -> Result<CategoryView, DomainError> {
        let post_count = self.repos.posts.count_by_category(category.id).await?;
        Ok(CategoryView {
            category,
            post_count,
        })
    }

    pub async fn tag(&self, tag: Tag) -> Result<TagView, DomainError> {
        let post_count = self.repos.posts.count_by_tag(tag.id).await?;
        Ok(TagView { tag, post_count })
    }

    pub async fn categories(&self, categories: Vec<Category>) -> Result<Vec<CategoryView>, DomainError> {
        let mut views = Vec::with_capacity(categories.len());
        for category in categories {
            views.push(self.category(category).await?);
        }
        Ok(views)
    }

    pub async fn tags(&self, tags: Vec<Tag>) -> Result<Vec<TagView>, DomainError> {
        let mut views = Vec::with_capacity(tags.len());
        for tag in tags {
            views.push(self.tag(tag).await?);
        }
        Ok(views)
    }

    pub async fn post(&self, post: Post) -> Result<PostView, DomainError> {
        let author = self
            .repos
            .authors
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", post.author_id))?;
        let category = self
            .repos
            .categories
            .find_by_id(post.category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", post.category_id))?;
        let category = self.category(category).await?;

        let mut found: HashMap<Uuid, Tag> = self
            .repos
            .tags
            .find_many(&post.tag_ids)
            .await?
            .into_iter()
            .map(|tag| (tag.id, tag))
            .collect();
        // Keep the post's own tag order.
        let tags = post.tag_ids.iter().filter_map(|id| found.remove(id)).collect();
        let tags = self.tags(tags).await?;

        let comments_count = self.repos.comments.count_by_post(post.id).await?;

        Ok(PostView {
            post,
            author,
            category,
            tags,
            comments_count,
        })
    }

    pub async fn posts(&self, posts: Vec<Post>) -> Result<Vec<PostView>, DomainError> {
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.post(post).await?);
        }
        Ok(views)
    }
}
