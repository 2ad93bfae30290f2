//! Declarative post listings: filters, ordering and pagination.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::domain::{Post, PostStatus};
use crate::error::DomainError;

/// Page size used by the published-post listing.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest row offset a page may start at; SQL `OFFSET` is a signed 64-bit value.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-based page of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Page numbers whose offset cannot be addressed are past the end of any listing.
    pub fn new(page: u64, page_size: u64) -> Result<Self, DomainError> {
        let offset = page
            .checked_sub(1)
            .zip(Some(page_size).filter(|&size| size > 0))
            .and_then(|(skipped, size)| skipped.checked_mul(size))
            .filter(|&offset| offset <= MAX_OFFSET);
        match offset {
            Some(_) => Ok(Self { page, page_size }),
            None => Err(DomainError::InvalidPage(page)),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    #[default]
    CreatedAtAsc,
    CreatedAtDesc,
}

impl PostOrder {
    /// Total order on posts. Equal timestamps fall back to the id so pages never overlap.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let ascending = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
        match self {
            PostOrder::CreatedAtAsc => ascending,
            PostOrder::CreatedAtDesc => ascending.reverse(),
        }
    }
}

/// Filters, order and page for [`PostRepository::query`](super::PostRepository::query).
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub category_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub order: PostOrder,
    pub page: Option<PageRequest>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_tag(mut self, tag_id: Uuid) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn order_by(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Whether `post` passes every filter.
    pub fn matches(&self, post: &Post) -> bool {
        self.status.is_none_or(|status| post.status == status)
            && self.category_id.is_none_or(|id| post.category_id == id)
            && self.tag_id.is_none_or(|id| post.tag_ids.contains(&id))
    }

    /// Filter, sort and slice an in-memory listing.
    pub fn apply<I>(&self, posts: I) -> Page<Post>
    where
        I: IntoIterator<Item = Post>,
    {
        let mut matched: Vec<Post> = posts.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.order.compare(a, b));
        let total = matched.len() as u64;

        match self.page {
            Some(request) => {
                let items = matched
                    .into_iter()
                    .skip(request.offset() as usize)
                    .take(request.page_size() as usize)
                    .collect();
                Page::new(items, total, request.page(), request.page_size())
            }
            None => Page::new(matched, total, 1, total),
        }
    }
}

/// One slice of an ordered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches across all pages.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, page_size: u64) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
        }
    }

    pub fn num_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// A page past the end is an error, except page 1 of an empty listing.
    pub fn ensure_in_range(self) -> Result<Self, DomainError> {
        if self.page > self.num_pages() {
            return Err(DomainError::InvalidPage(self.page));
        }
        Ok(self)
    }
}
