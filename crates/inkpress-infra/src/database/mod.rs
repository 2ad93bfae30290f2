//! PostgreSQL storage.

mod connections;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::{connect, ensure_schema};

#[cfg(feature = "postgres")]
pub use sea_orm::DbErr;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresAuthorRepository, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresPostRepository, PostgresTagRepository,
};

#[cfg(feature = "postgres")]
pub use postgres_base::PostgresBaseRepository;

#[cfg(feature = "postgres")]
use inkpress_core::ports::Repositories;

/// Repository handles backed by one connection pool.
#[cfg(feature = "postgres")]
pub fn repositories(db: sea_orm::DbConn) -> Repositories {
    use std::sync::Arc;

    let db = Arc::new(db);
    Repositories {
        authors: Arc::new(PostgresAuthorRepository::new(Arc::clone(&db))),
        categories: Arc::new(PostgresCategoryRepository::new(Arc::clone(&db))),
        tags: Arc::new(PostgresTagRepository::new(Arc::clone(&db))),
        posts: Arc::new(PostgresPostRepository::new(Arc::clone(&db))),
        comments: Arc::new(PostgresCommentRepository::new(db)),
    }
}
