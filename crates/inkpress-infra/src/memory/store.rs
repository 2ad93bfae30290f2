//! In-memory store - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpress_core::domain::{Author, Category, Comment, Post, Tag};
use inkpress_core::error::RepoError;
use inkpress_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, Page, PostQuery,
    PostRepository, TagRepository,
};
use inkpress_core::thread::ThreadIndex;

#[derive(Default)]
struct Tables {
    authors: HashMap<Uuid, Author>,
    categories: HashMap<Uuid, Category>,
    tags: HashMap<Uuid, Tag>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    /// Author, category and tags must exist, like the foreign keys on `posts`.
    fn check_post_refs(&self, post: &Post) -> Result<(), RepoError> {
        if !self.authors.contains_key(&post.author_id) {
            return Err(RepoError::dangling("author", post.author_id));
        }
        if !self.categories.contains_key(&post.category_id) {
            return Err(RepoError::dangling("category", post.category_id));
        }
        match post.tag_ids.iter().find(|id| !self.tags.contains_key(id)) {
            Some(id) => Err(RepoError::dangling("tags", *id)),
            None => Ok(()),
        }
    }

    /// The post and any parent comment must exist, like the foreign keys on `comments`.
    fn check_comment_refs(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::dangling("post", comment.post_id));
        }
        match comment.parent_id {
            Some(id) if !self.comments.contains_key(&id) => {
                Err(RepoError::dangling("parent_comment", id))
            }
            _ => Ok(()),
        }
    }

    /// Remove the posts and every comment on them.
    fn remove_posts(&mut self, post_ids: &[Uuid]) {
        let roots: Vec<Uuid> = self
            .comments
            .values()
            .filter(|c| post_ids.contains(&c.post_id))
            .map(|c| c.id)
            .collect();
        self.remove_comments(&roots);
        for id in post_ids {
            self.posts.remove(id);
        }
    }

    /// Remove the comments and everything that replies to them.
    fn remove_comments(&mut self, roots: &[Uuid]) {
        let doomed = ThreadIndex::new(self.comments.values()).subtree(roots);
        self.comments.retain(|id, _| !doomed.contains(id));
    }
}

/// Arena of records keyed by id behind one async RwLock.
///
/// Every write, cascades included, happens under a single write guard, so
/// readers never see half of a delete. Data is lost on process restart.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn save(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .authors
            .values()
            .any(|a| a.id != author.id && a.email == author.email)
        {
            return Err(RepoError::constraint("email"));
        }
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.authors.remove(&id).ok_or(RepoError::NotFound)?;
        let posts: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.remove_posts(&posts);
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.authors.values().find(|a| a.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<Author>, RepoError> {
        let tables = self.tables.read().await;
        let authors: Vec<Author> = tables.authors.values().cloned().collect();
        Ok(sorted_by(authors, |a| (a.name.clone(), a.id)))
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(RepoError::constraint("slug"));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        let posts: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.category_id == id)
            .map(|p| p.id)
            .collect();
        tables.remove_posts(&posts);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let categories: Vec<Category> = tables.categories.values().cloned().collect();
        Ok(sorted_by(categories, |c| c.slug.clone()))
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn save(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .tags
            .values()
            .any(|t| t.id != tag.id && t.slug == tag.slug)
        {
            return Err(RepoError::constraint("slug"));
        }
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    /// Untags posts; the posts themselves stay.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            post.tag_ids.retain(|tag_id| *tag_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let tags: Vec<Tag> = tables.tags.values().cloned().collect();
        Ok(sorted_by(tags, |t| t.slug.clone()))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.tags.get(id)).cloned().collect())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(RepoError::constraint("slug"));
        }
        tables.check_post_refs(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_posts(&[id]);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn query(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(query.apply(tables.posts.values().cloned()))
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .values()
            .filter(|p| p.category_id == category_id)
            .count();
        Ok(count as u64)
    }

    async fn count_by_tag(&self, tag_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .values()
            .filter(|p| p.tag_ids.contains(&tag_id))
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_comment_refs(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_comments(&[id]);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let comments: Vec<Comment> = tables.comments.values().cloned().collect();
        Ok(sorted_by(comments, |c| (c.created_at, c.id)))
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        Ok(sorted_by(comments, |c| (c.created_at, c.id)))
    }

    async fn replies_of(&self, comment_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let replies: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.parent_id == Some(comment_id))
            .cloned()
            .collect();
        Ok(sorted_by(replies, |c| (c.created_at, c.id)))
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        let count = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count();
        Ok(count as u64)
    }
}
