use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseTransaction, DbConn, DbErr,
    EntityTrait, IntoActiveModel, PrimaryKeyTrait, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use inkpress_core::error::RepoError;
use inkpress_core::ports::BaseRepository;

/// Rows that must go before a row of this entity can be deleted.
#[async_trait]
pub trait Cascade: EntityTrait {
    async fn remove_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<(), DbErr>;
}

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T> BaseRepository<T, Uuid> for PostgresBaseRepository<E>
where
    E: Cascade,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(self.db.as_ref()).await.map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let model = upsert(self.db.as_ref(), entity.into()).await?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(query_err)?;
        E::remove_dependents(&txn, id).await.map_err(query_err)?;

        let result = E::delete_by_id(id).exec(&txn).await.map_err(query_err)?;
        if result.rows_affected == 0 {
            txn.rollback().await.map_err(query_err)?;
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(query_err)?;
        Ok(())
    }
}

/// Update the row with the model's key, or insert it when there is none.
pub(crate) async fn upsert<A, C>(
    conn: &C,
    active_model: A,
) -> Result<<A::Entity as EntityTrait>::Model, RepoError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    match active_model.clone().update(conn).await {
        Ok(model) => Ok(model),
        Err(DbErr::RecordNotUpdated) => active_model.insert(conn).await.map_err(write_err),
        Err(e) => Err(write_err(e)),
    }
}

pub(crate) fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Unique violations become [`RepoError::Constraint`] naming the column.
pub(crate) fn write_err(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            let field = if detail.contains("email") { "email" } else { "slug" };
            RepoError::constraint(field)
        }
        _ => RepoError::Query(e.to_string()),
    }
}
