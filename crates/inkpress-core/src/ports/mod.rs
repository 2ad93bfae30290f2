//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod query;
mod repository;

use std::sync::Arc;

pub use query::{DEFAULT_PAGE_SIZE, Page, PageRequest, PostOrder, PostQuery};
pub use repository::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, PostRepository,
    TagRepository,
};

/// One handle per entity store, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// Use a single store for every entity.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AuthorRepository
            + CategoryRepository
            + TagRepository
            + PostRepository
            + CommentRepository
            + 'static,
    {
        Self {
            authors: store.clone(),
            categories: store.clone(),
            tags: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }
}
