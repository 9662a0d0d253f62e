//! In-process stores with the same semantics as the PostgreSQL ones.
//!
//! Used by the test suites and by `serve --in-memory` for local work without
//! a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::database::benchmark_store::BenchmarkStore;
use crate::database::manager::DatabaseError;
use crate::database::models::preference::Preference;
use crate::database::models::{Benchmark, Metrics, Project, ProjectStatus};
use crate::database::preference_store::PreferenceStore;
use crate::database::project_store::{GuardedUpdate, MutationGuard, ProjectStore};
use crate::filter::ProjectScope;

#[derive(Clone, Default)]
pub struct MemoryProjectStore {
    projects: Arc<RwLock<BTreeMap<Uuid, Project>>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed documents, assigning ids to those without one.
    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        {
            let mut stored = self.projects.write().unwrap_or_else(PoisonError::into_inner);
            for mut project in projects {
                let id = *project.id.get_or_insert_with(Uuid::new_v4);
                stored.insert(id, project);
            }
        }
        self
    }

    fn guarded<F>(&self, id: Uuid, guard: &MutationGuard, apply: F) -> GuardedUpdate
    where
        F: FnOnce(&mut Project),
    {
        let mut stored = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        match stored.get_mut(&id) {
            None => GuardedUpdate::Missing,
            Some(project) if !guard.admits(project) => GuardedUpdate::Rejected(project.clone()),
            Some(project) => {
                apply(project);
                GuardedUpdate::Applied(project.clone())
            }
        }
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn find(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let stored = self.projects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.get(&id).cloned())
    }

    async fn find_many(&self, scope: &ProjectScope) -> Result<Vec<Project>, DatabaseError> {
        let stored = self.projects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.values().filter(|p| scope.matches(p)).cloned().collect())
    }

    async fn insert(&self, project: &Project) -> Result<(), DatabaseError> {
        let id = project
            .id
            .ok_or_else(|| DatabaseError::QueryError("project id must be assigned before insert".to_string()))?;
        let mut stored = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        if stored.contains_key(&id) {
            return Err(DatabaseError::QueryError(format!("duplicate project id {}", id)));
        }
        stored.insert(id, project.clone());
        Ok(())
    }

    async fn replace(&self, id: Uuid, project: &Project) -> Result<Option<Project>, DatabaseError> {
        let mut stored = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.get_mut(&id).map(|current| {
            let mut next = project.clone();
            next.status = current.status;
            next.completion_date = current.completion_date;
            *current = next;
            current.clone()
        }))
    }

    async fn set_metrics(
        &self,
        id: Uuid,
        metrics: &Metrics,
        guard: &MutationGuard,
    ) -> Result<GuardedUpdate, DatabaseError> {
        Ok(self.guarded(id, guard, |project| project.metrics = metrics.clone()))
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completion_date: DateTime<Utc>,
        guard: &MutationGuard,
    ) -> Result<GuardedUpdate, DatabaseError> {
        Ok(self.guarded(id, guard, |project| {
            project.status = ProjectStatus::Completed;
            project.completion_date = Some(completion_date);
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut stored = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryBenchmarkStore {
    benchmarks: Arc<RwLock<BTreeMap<Uuid, Benchmark>>>,
}

impl MemoryBenchmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BenchmarkStore for MemoryBenchmarkStore {
    async fn list(&self) -> Result<Vec<Benchmark>, DatabaseError> {
        let stored = self.benchmarks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.values().cloned().collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Benchmark>, DatabaseError> {
        let stored = self.benchmarks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.get(&id).cloned())
    }

    async fn insert(&self, id: Uuid, benchmark: &Benchmark) -> Result<(), DatabaseError> {
        let mut stored = self.benchmarks.write().unwrap_or_else(PoisonError::into_inner);
        stored.insert(id, benchmark.clone());
        Ok(())
    }

    async fn replace(&self, id: Uuid, benchmark: &Benchmark) -> Result<Option<Benchmark>, DatabaseError> {
        let mut stored = self.benchmarks.write().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.get_mut(&id).map(|current| {
            *current = benchmark.clone();
            current.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut stored = self.benchmarks.write().unwrap_or_else(PoisonError::into_inner);
        Ok(stored.remove(&id).is_some())
    }
}

#[derive(Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, id: &str) -> Result<Option<Preference>, DatabaseError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(id).map(|value| Preference {
            id: id.to_string(),
            value: value.clone(),
        }))
    }

    async fn add_to_list(&self, id: &str, item: &str) -> Result<Preference, DatabaseError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let entry = values
            .entry(id.to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = serde_json::Value::Array(Vec::new());
        }
        if let serde_json::Value::Array(items) = &mut *entry {
            if !items.iter().any(|v| v.as_str() == Some(item)) {
                items.push(serde_json::Value::String(item.to_string()));
            }
        }

        Ok(Preference {
            id: id.to_string(),
            value: entry.clone(),
        })
    }
}
