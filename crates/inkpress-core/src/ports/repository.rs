use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, Category, Comment, Post, Tag};
use crate::error::RepoError;
use crate::ports::query::{Page, PostQuery};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    ///
    /// Unique columns are enforced here and reported as
    /// [`RepoError::Constraint`] naming the column.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, together with everything that depends on it.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError>;

    async fn list(&self) -> Result<Vec<Author>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    async fn list(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    async fn list(&self) -> Result<Vec<Tag>, RepoError>;

    /// The subset of `ids` that exist, in no particular order.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError>;
}

/// Post repository. `delete` removes the post's comments in the same write.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn query(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError>;

    async fn count_by_tag(&self, tag_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository. `delete` removes every reply below the comment in the same write.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments, oldest first.
    async fn list(&self) -> Result<Vec<Comment>, RepoError>;

    /// Comments on one post, oldest first.
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Direct replies to a comment, oldest first.
    async fn replies_of(&self, comment_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
