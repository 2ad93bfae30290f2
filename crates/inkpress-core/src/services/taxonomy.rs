use crate::domain::{Category, CategoryPatch, NewCategory, NewTag, Tag, TagPatch};
use crate::error::DomainError;
use crate::ports::Repositories;
use crate::projection::{CategoryView, Projector, TagView};

use super::ensure_unique;

/// Categories and tags, the two slugged groupings of posts.
#[derive(Clone)]
pub struct TaxonomyService {
    repos: Repositories,
    projector: Projector,
}

impl TaxonomyService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            projector: Projector::new(repos.clone()),
            repos,
        }
    }

    pub async fn create_category(&self, input: NewCategory) -> Result<CategoryView, DomainError> {
        let category = Category::new(input)?;
        let existing = self.repos.categories.find_by_slug(&category.slug).await?;
        ensure_unique(existing, category.id, |c| c.id, "category", "slug")?;

        let category = self.repos.categories.save(category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        self.projector.category(category).await
    }

    /// Partial update by slug. Renaming moves the category to the new slug.
    pub async fn update_category(
        &self,
        slug: &str,
        patch: CategoryPatch,
    ) -> Result<CategoryView, DomainError> {
        let mut category = self.category(slug).await?;
        category.apply(patch)?;
        if category.slug != slug {
            let existing = self.repos.categories.find_by_slug(&category.slug).await?;
            ensure_unique(existing, category.id, |c| c.id, "category", "slug")?;
        }

        let category = self.repos.categories.save(category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category updated");
        self.projector.category(category).await
    }

    pub async fn category(&self, slug: &str) -> Result<Category, DomainError> {
        self.repos
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", slug))
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        let categories = self.repos.categories.list().await?;
        self.projector.categories(categories).await
    }

    pub async fn create_tag(&self, input: NewTag) -> Result<TagView, DomainError> {
        let tag = Tag::new(input)?;
        let existing = self.repos.tags.find_by_slug(&tag.slug).await?;
        ensure_unique(existing, tag.id, |t| t.id, "tags", "slug")?;

        let tag = self.repos.tags.save(tag).await?;
        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        self.projector.tag(tag).await
    }

    pub async fn update_tag(&self, slug: &str, patch: TagPatch) -> Result<TagView, DomainError> {
        let mut tag = self.tag(slug).await?;
        tag.apply(patch)?;
        if tag.slug != slug {
            let existing = self.repos.tags.find_by_slug(&tag.slug).await?;
            ensure_unique(existing, tag.id, |t| t.id, "tags", "slug")?;
        }

        let tag = self.repos.tags.save(tag).await?;
        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Tag updated");
        self.projector.tag(tag).await
    }

    pub async fn tag(&self, slug: &str) -> Result<Tag, DomainError> {
        self.repos
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Tag", slug))
    }

    pub async fn list_tags(&self) -> Result<Vec<TagView>, DomainError> {
        let tags = self.repos.tags.list().await?;
        self.projector.tags(tags).await
    }
}
