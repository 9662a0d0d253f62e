use serde::{de::DeserializeOwned, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, ProjectScope};

/// A table of `(id UUID, doc JSONB)` rows holding one document type.
pub struct Repository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Result<Self, DatabaseError> {
        let table_name = table_name.into();
        Filter::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        self.fetch_filtered(Filter::new(&self.table_name)?).await
    }

    pub async fn select_any(&self, scope: ProjectScope) -> Result<Vec<T>, DatabaseError> {
        let mut filter = Filter::new(&self.table_name)?;
        filter.scope(scope);
        self.fetch_filtered(filter).await
    }

    async fn fetch_filtered(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        let sql_result = filter.to_sql();

        let mut q = sqlx::query_scalar::<_, Json<T>>(&sql_result.query);
        for p in sql_result.params {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT doc FROM \"{}\" WHERE id = $1", self.table_name);
        let row = sqlx::query_scalar::<_, Json<T>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    pub async fn insert(&self, id: Uuid, doc: &T) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO \"{}\" (id, doc) VALUES ($1, $2)", self.table_name);
        sqlx::query(&sql).bind(id).bind(Json(doc)).execute(&self.pool).await?;
        Ok(())
    }

    /// Full replace; `None` when no row has this id.
    pub async fn replace(&self, id: Uuid, doc: &T) -> Result<Option<T>, DatabaseError> {
        let sql = format!("UPDATE \"{}\" SET doc = $2 WHERE id = $1 RETURNING doc", self.table_name);
        let row = sqlx::query_scalar::<_, Json<T>>(&sql)
            .bind(id)
            .bind(Json(doc))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    /// Hard delete; `false` when no row has this id.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
