//! Application state - shared across all handlers.

use std::sync::Arc;

use inkpress_core::ports::Repositories;
use inkpress_core::services::{AuthorService, CommentService, PostService, TaxonomyService};
use inkpress_infra::InMemoryStore;
use inkpress_infra::database::DatabaseConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authors: AuthorService,
    pub taxonomy: TaxonomyService,
    pub posts: PostService,
    pub comments: CommentService,
    /// Which store backs the repositories, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Wire the services onto one set of repositories.
    pub fn from_repositories(repos: Repositories, storage: &'static str) -> Self {
        Self {
            authors: AuthorService::new(repos.clone()),
            taxonomy: TaxonomyService::new(repos.clone()),
            posts: PostService::new(repos.clone()),
            comments: CommentService::new(repos),
            storage,
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::from_repositories(Repositories::from_store(Arc::new(InMemoryStore::new())), "memory")
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match Self::postgres(config).await {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory store");
            Self::in_memory()
        };

        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &DatabaseConfig) -> Result<Self, inkpress_infra::database::DbErr> {
        use inkpress_infra::database;

        let db = database::connect(config).await?;
        database::ensure_schema(&db).await?;
        Ok(Self::from_repositories(database::repositories(db), "postgres"))
    }
}
