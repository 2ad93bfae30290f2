#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn, DbErr, Schema};

#[cfg(feature = "postgres")]
use super::entity::{author, category, comment, post, post_tag, tag};

/// Configuration for the blog database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Open a pooled connection to the database described by `config`.
#[cfg(feature = "postgres")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Connecting to database...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let db = Database::connect(opts).await?;
    tracing::info!(pool = config.max_connections, "Database connected");
    Ok(db)
}

/// Create any missing tables, parents before children.
#[cfg(feature = "postgres")]
pub async fn ensure_schema(db: &DbConn) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(author::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(tag::Entity),
        schema.create_table_from_entity(post::Entity),
        schema.create_table_from_entity(post_tag::Entity),
        schema.create_table_from_entity(comment::Entity),
    ];
    for mut statement in statements {
        db.execute(backend.build(statement.if_not_exists())).await?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}
