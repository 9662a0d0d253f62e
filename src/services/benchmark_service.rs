use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::benchmark_store::BenchmarkStore;
use crate::database::models::Benchmark;
use crate::services::access;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::parse_id;
use crate::types::{Caller, Role};

/// Cost benchmark documents. Reads of the full list are open to any
/// authenticated caller; everything else is admin only.
#[derive(Clone)]
pub struct BenchmarkService {
    store: Arc<dyn BenchmarkStore>,
}

impl BenchmarkService {
    pub fn new(store: Arc<dyn BenchmarkStore>) -> Self {
        Self { store }
    }

    pub async fn list_benchmarks(&self, _caller: &Caller) -> ServiceResult<Vec<Benchmark>> {
        Ok(self.store.list().await?)
    }

    pub async fn get_benchmark(&self, caller: &Caller, id: &str) -> ServiceResult<Benchmark> {
        access::require_any(caller, &[Role::Admin])?;
        let id = parse_id("benchmark", id)?;

        self.store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("benchmark {}", id)))
    }

    pub async fn create_benchmark(&self, caller: &Caller, mut benchmark: Benchmark) -> ServiceResult<Benchmark> {
        access::require_any(caller, &[Role::Admin])?;
        benchmark.validate()?;

        let id = Uuid::new_v4();
        benchmark.id = Some(id);
        self.store.insert(id, &benchmark).await?;

        info!(benchmark_id = %id, "Created benchmark");
        Ok(benchmark)
    }

    pub async fn update_benchmark(
        &self,
        caller: &Caller,
        id: &str,
        mut benchmark: Benchmark,
    ) -> ServiceResult<Benchmark> {
        access::require_any(caller, &[Role::Admin])?;
        let id = parse_id("benchmark", id)?;
        benchmark.validate()?;
        benchmark.id = Some(id);

        self.store
            .replace(id, &benchmark)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("benchmark {}", id)))
    }

    pub async fn delete_benchmark(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        access::require_any(caller, &[Role::Admin])?;
        let id = parse_id("benchmark", id)?;

        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(format!("benchmark {}", id)));
        }
        info!(benchmark_id = %id, "Deleted benchmark");
        Ok(())
    }
}
