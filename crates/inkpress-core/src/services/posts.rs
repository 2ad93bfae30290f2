use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::{NewPost, Post, PostPatch, PostStatus};
use crate::error::DomainError;
use crate::ports::{DEFAULT_PAGE_SIZE, Page, PageRequest, PostOrder, PostQuery, Repositories};
use crate::projection::{PostView, Projector};
use crate::validation::FieldErrors;

use super::{ensure_unique, missing_reference};

#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    projector: Projector,
}

impl PostService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            projector: Projector::new(repos.clone()),
            repos,
        }
    }

    /// Published posts, newest first, [`DEFAULT_PAGE_SIZE`] per page.
    pub async fn list_published(&self, page: u64) -> Result<Page<PostView>, DomainError> {
        let query = PostQuery::new()
            .with_status(PostStatus::Published)
            .order_by(PostOrder::CreatedAtDesc)
            .paginate(PageRequest::new(page, DEFAULT_PAGE_SIZE)?);
        let page = self.repos.posts.query(&query).await?.ensure_in_range()?;

        let views = self.projector.posts(page.items).await?;
        Ok(Page::new(views, page.total, page.page, page.page_size))
    }

    /// Every post in the category, drafts included.
    pub async fn in_category(&self, category_id: Uuid) -> Result<Vec<PostView>, DomainError> {
        let query = PostQuery::new().in_category(category_id);
        let page = self.repos.posts.query(&query).await?;
        self.projector.posts(page.items).await
    }

    /// Every post carrying the tag, drafts included.
    pub async fn with_tag(&self, tag_id: Uuid) -> Result<Vec<PostView>, DomainError> {
        let query = PostQuery::new().with_tag(tag_id);
        let page = self.repos.posts.query(&query).await?;
        self.projector.posts(page.items).await
    }

    pub async fn create(&self, input: NewPost) -> Result<PostView, DomainError> {
        let mut errors = FieldErrors::new();
        self.check_references(
            input.author_id,
            input.category_id,
            Some(&input.tag_ids),
            &mut errors,
        )
        .await?;
        let post = errors.absorb(Post::new(input));
        let post = errors.finish(post)?;

        self.ensure_unique_slug(&post).await?;
        let post = self.repos.posts.save(post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, status = %post.status, "Post created");
        self.projector.post(post).await
    }

    pub async fn get(&self, slug: &str) -> Result<PostView, DomainError> {
        let post = self.find(slug).await?;
        self.projector.post(post).await
    }

    /// Partial update by slug. A title in the patch moves the post to a new slug.
    pub async fn update(&self, slug: &str, patch: PostPatch) -> Result<PostView, DomainError> {
        let mut post = self.find(slug).await?;

        let mut errors = FieldErrors::new();
        self.check_references(
            patch.author_id,
            patch.category_id,
            patch.tag_ids.as_ref(),
            &mut errors,
        )
        .await?;
        let applied = errors.absorb(post.apply(patch));
        errors.finish(applied)?;

        if post.slug != slug {
            self.ensure_unique_slug(&post).await?;
        }
        let post = self.repos.posts.save(post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post updated");
        self.projector.post(post).await
    }

    /// Delete the post and every comment on it.
    pub async fn delete(&self, slug: &str) -> Result<(), DomainError> {
        let post = self.find(slug).await?;
        self.repos.posts.delete(post.id).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post deleted");
        Ok(())
    }

    pub async fn find(&self, slug: &str) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))
    }

    async fn ensure_unique_slug(&self, post: &Post) -> Result<(), DomainError> {
        let existing = self.repos.posts.find_by_slug(&post.slug).await?;
        ensure_unique(existing, post.id, |p| p.id, "post", "slug")
    }

    /// Record an error for each supplied reference that does not resolve.
    async fn check_references(
        &self,
        author_id: Option<Uuid>,
        category_id: Option<Uuid>,
        tag_ids: Option<&Vec<Uuid>>,
        errors: &mut FieldErrors,
    ) -> Result<(), DomainError> {
        if let Some(id) = author_id {
            if self.repos.authors.find_by_id(id).await?.is_none() {
                errors.add("author", missing_reference(id));
            }
        }
        if let Some(id) = category_id {
            if self.repos.categories.find_by_id(id).await?.is_none() {
                errors.add("category", missing_reference(id));
            }
        }
        if let Some(ids) = tag_ids.filter(|ids| !ids.is_empty()) {
            let found: HashSet<Uuid> = self
                .repos
                .tags
                .find_many(ids)
                .await?
                .into_iter()
                .map(|tag| tag.id)
                .collect();
            for id in ids.iter().filter(|id| !found.contains(id)) {
                errors.add("tags", missing_reference(*id));
            }
        }
        Ok(())
    }
}
