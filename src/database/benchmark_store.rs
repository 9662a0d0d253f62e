use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Benchmark;
use crate::database::repository::Repository;

/// Persistence of benchmark documents.
#[async_trait]
pub trait BenchmarkStore: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Benchmark>, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<Benchmark>, DatabaseError>;

    async fn insert(&self, id: Uuid, benchmark: &Benchmark) -> Result<(), DatabaseError>;

    async fn replace(&self, id: Uuid, benchmark: &Benchmark) -> Result<Option<Benchmark>, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

pub struct PgBenchmarkStore {
    repository: Repository<Benchmark>,
}

impl PgBenchmarkStore {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            repository: Repository::new("benchmarks", pool)?,
        })
    }
}

#[async_trait]
impl BenchmarkStore for PgBenchmarkStore {
    async fn list(&self) -> Result<Vec<Benchmark>, DatabaseError> {
        self.repository.select_all().await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Benchmark>, DatabaseError> {
        self.repository.select_one(id).await
    }

    async fn insert(&self, id: Uuid, benchmark: &Benchmark) -> Result<(), DatabaseError> {
        self.repository.insert(id, benchmark).await
    }

    async fn replace(&self, id: Uuid, benchmark: &Benchmark) -> Result<Option<Benchmark>, DatabaseError> {
        self.repository.replace(id, benchmark).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.repository.delete(id).await
    }
}
