//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{IntoCondition, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbConn, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use inkpress_core::domain::{Author, Category, Comment, Post, Tag};
use inkpress_core::error::RepoError;
use inkpress_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, Page, PostOrder,
    PostQuery, PostRepository, TagRepository,
};
use inkpress_core::thread::ThreadIndex;

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{Cascade, PostgresBaseRepository, query_err, upsert};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Delete posts together with their comments and tag links.
async fn remove_posts<C>(conn: &C, post_ids: Vec<Uuid>) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if post_ids.is_empty() {
        return Ok(());
    }
    CommentEntity::delete_many()
        .filter(comment::Column::PostId.is_in(post_ids.clone()))
        .exec(conn)
        .await?;
    PostTagEntity::delete_many()
        .filter(post_tag::Column::PostId.is_in(post_ids.clone()))
        .exec(conn)
        .await?;
    PostEntity::delete_many()
        .filter(post::Column::Id.is_in(post_ids))
        .exec(conn)
        .await?;
    Ok(())
}

async fn post_ids_where<C, F>(conn: &C, condition: F) -> Result<Vec<Uuid>, DbErr>
where
    C: ConnectionTrait,
    F: IntoCondition,
{
    PostEntity::find()
        .select_only()
        .column(post::Column::Id)
        .filter(condition)
        .into_tuple::<Uuid>()
        .all(conn)
        .await
}

#[async_trait]
impl Cascade for AuthorEntity {
    async fn remove_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<(), DbErr> {
        let posts = post_ids_where(txn, post::Column::AuthorId.eq(id)).await?;
        remove_posts(txn, posts).await
    }
}

#[async_trait]
impl Cascade for CategoryEntity {
    async fn remove_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<(), DbErr> {
        let posts = post_ids_where(txn, post::Column::CategoryId.eq(id)).await?;
        remove_posts(txn, posts).await
    }
}

#[async_trait]
impl Cascade for TagEntity {
    async fn remove_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<(), DbErr> {
        PostTagEntity::delete_many()
            .filter(post_tag::Column::TagId.eq(id))
            .exec(txn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Cascade for CommentEntity {
    /// Remove every reply below the comment, computed from the post's thread.
    async fn remove_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<(), DbErr> {
        let Some(root) = CommentEntity::find_by_id(id).one(txn).await? else {
            return Ok(());
        };
        let siblings: Vec<Comment> = CommentEntity::find()
            .filter(comment::Column::PostId.eq(root.post_id))
            .all(txn)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let mut doomed = ThreadIndex::new(&siblings).subtree(&[id]);
        doomed.remove(&id);
        if doomed.is_empty() {
            return Ok(());
        }

        CommentEntity::delete_many()
            .filter(comment::Column::Id.is_in(doomed))
            .exec(txn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            },
            None => "***".to_string(),
        };
        tracing::debug!(author_email = %masked, "Finding author by email");

        let result = AuthorEntity::find()
            .filter(author::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Author>, RepoError> {
        let result = AuthorEntity::find()
            .order_by_asc(author::Column::Name)
            .order_by_asc(author::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Slug)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .order_by_asc(tag::Column::Slug)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = TagEntity::find()
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list(&self) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn replies_of(&self, comment_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::ParentId.eq(comment_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(query_err)
    }
}

/// PostgreSQL post repository. Tag links are stored in `post_tags`.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }

    /// Attach tag links to the loaded rows, keeping their order.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .all(self.db.as_ref())
            .await
            .map_err(query_err)?;

        let mut tags: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            tags.entry(link.post_id).or_default().push(link.tag_id);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let tag_ids = tags.remove(&model.id).unwrap_or_default();
                model.into_domain(tag_ids)
            })
            .collect())
    }

    async fn one_with_tags(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;
        self.one_with_tags(model).await
    }

    /// Write the row and replace its tag links in one transaction.
    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(query_err)?;

        let model = upsert(&txn, post::ActiveModel::from(&entity)).await?;
        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(model.id))
            .exec(&txn)
            .await
            .map_err(query_err)?;
        if !entity.tag_ids.is_empty() {
            let links = entity.tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
                post_id: Set(model.id),
                tag_id: Set(*tag_id),
            });
            PostTagEntity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(query_err)?;
        }

        txn.commit().await.map_err(query_err)?;
        Ok(model.into_domain(entity.tag_ids))
    }

    /// Delete the post, its comments and its tag links in one transaction.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(query_err)?;

        let exists = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_err)?
            .is_some();
        if !exists {
            txn.rollback().await.map_err(query_err)?;
            return Err(RepoError::NotFound);
        }
        remove_posts(&txn, vec![id]).await.map_err(query_err)?;

        txn.commit().await.map_err(query_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_err)?;
        self.one_with_tags(model).await
    }

    async fn query(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(status) = query.status {
            select = select.filter(post::Column::Status.eq(post::Status::from(status)));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(tag_id) = query.tag_id {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTagEntity)
                        .and_where(post_tag::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            );
        }
        select = match query.order {
            PostOrder::CreatedAtAsc => select
                .order_by_asc(post::Column::CreatedAt)
                .order_by_asc(post::Column::Id),
            PostOrder::CreatedAtDesc => select
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id),
        };

        let total = select.clone().count(self.db.as_ref()).await.map_err(query_err)?;
        let (page, page_size) = match query.page {
            Some(request) => {
                select = select
                    .offset(request.offset())
                    .limit(request.page_size());
                (request.page(), request.page_size())
            }
            None => (1, total),
        };

        let models = select.all(self.db.as_ref()).await.map_err(query_err)?;
        let posts = self.with_tags(models).await?;
        Ok(Page::new(posts, total, page, page_size))
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .count(self.db.as_ref())
            .await
            .map_err(query_err)
    }

    async fn count_by_tag(&self, tag_id: Uuid) -> Result<u64, RepoError> {
        PostTagEntity::find()
            .filter(post_tag::Column::TagId.eq(tag_id))
            .count(self.db.as_ref())
            .await
            .map_err(query_err)
    }
}
