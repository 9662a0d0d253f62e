use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Metrics, Project};
use crate::database::repository::Repository;
use crate::filter::ProjectScope;

/// Preconditions evaluated atomically with a single-document update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationGuard {
    /// Only apply when this subject is the project lead.
    pub lead_id: Option<String>,
    /// Only apply while the project has not been completed.
    pub require_active: bool,
}

impl MutationGuard {
    pub fn admits(&self, project: &Project) -> bool {
        let lead_ok = self
            .lead_id
            .as_deref()
            .map_or(true, |lead| project.team.is_lead(lead));
        let status_ok = !self.require_active || !project.status.is_completed();
        lead_ok && status_ok
    }
}

/// Outcome of a guarded update.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedUpdate {
    /// The update was applied; carries the stored document afterwards.
    Applied(Project),
    /// The document exists but a guard condition failed; carries it unchanged.
    Rejected(Project),
    Missing,
}

/// Persistence of project documents.
#[async_trait]
pub trait ProjectStore: Send + Sync + 'static {
    async fn find(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;

    async fn find_many(&self, scope: &ProjectScope) -> Result<Vec<Project>, DatabaseError>;

    /// Stores a new document. The project must already carry its id.
    async fn insert(&self, project: &Project) -> Result<(), DatabaseError>;

    /// Replaces the document at `id`, keeping the stored `status` and
    /// `completionDate`. `None` when no document has this id.
    async fn replace(&self, id: Uuid, project: &Project) -> Result<Option<Project>, DatabaseError>;

    async fn set_metrics(
        &self,
        id: Uuid,
        metrics: &Metrics,
        guard: &MutationGuard,
    ) -> Result<GuardedUpdate, DatabaseError>;

    async fn mark_completed(
        &self,
        id: Uuid,
        completion_date: DateTime<Utc>,
        guard: &MutationGuard,
    ) -> Result<GuardedUpdate, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const LEAD_GUARD: &str = "($3::text IS NULL OR doc #>> '{team,projectLead,id}' = $3)";
const ACTIVE_GUARD: &str = "(NOT $4 OR coalesce(doc ->> 'status', '') <> 'completed')";

/// PostgreSQL-backed project store over the `projects` table.
pub struct PgProjectStore {
    repository: Repository<Project>,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            repository: Repository::new("projects", pool)?,
        })
    }

    async fn classify_miss(&self, id: Uuid) -> Result<GuardedUpdate, DatabaseError> {
        Ok(match self.repository.select_one(id).await? {
            Some(current) => GuardedUpdate::Rejected(current),
            None => GuardedUpdate::Missing,
        })
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        self.repository.select_one(id).await
    }

    async fn find_many(&self, scope: &ProjectScope) -> Result<Vec<Project>, DatabaseError> {
        self.repository.select_any(scope.clone()).await
    }

    async fn insert(&self, project: &Project) -> Result<(), DatabaseError> {
        let id = project
            .id
            .ok_or_else(|| DatabaseError::QueryError("project id must be assigned before insert".to_string()))?;
        self.repository.insert(id, project).await
    }

    async fn replace(&self, id: Uuid, project: &Project) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET doc = $2::jsonb || jsonb_build_object(\
                'status', coalesce(doc -> 'status', '\"\"'::jsonb), \
                'completionDate', coalesce(doc -> 'completionDate', 'null'::jsonb)) \
             WHERE id = $1 RETURNING doc",
            self.repository.table_name()
        );
        let row = sqlx::query_scalar::<_, Json<Project>>(&sql)
            .bind(id)
            .bind(Json(project))
            .fetch_optional(self.repository.pool())
            .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    async fn set_metrics(
        &self,
        id: Uuid,
        metrics: &Metrics,
        guard: &MutationGuard,
    ) -> Result<GuardedUpdate, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET doc = jsonb_set(doc, '{{metrics}}', $2::jsonb) \
             WHERE id = $1 AND {} AND {} RETURNING doc",
            self.repository.table_name(),
            LEAD_GUARD,
            ACTIVE_GUARD
        );
        let row = sqlx::query_scalar::<_, Json<Project>>(&sql)
            .bind(id)
            .bind(Json(metrics))
            .bind(guard.lead_id.as_deref())
            .bind(guard.require_active)
            .fetch_optional(self.repository.pool())
            .await?;

        match row {
            Some(Json(updated)) => Ok(GuardedUpdate::Applied(updated)),
            None => self.classify_miss(id).await,
        }
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completion_date: DateTime<Utc>,
        guard: &MutationGuard,
    ) -> Result<GuardedUpdate, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET doc = doc || jsonb_build_object('status', 'completed', 'completionDate', $2::jsonb) \
             WHERE id = $1 AND {} AND {} RETURNING doc",
            self.repository.table_name(),
            LEAD_GUARD,
            ACTIVE_GUARD
        );
        let row = sqlx::query_scalar::<_, Json<Project>>(&sql)
            .bind(id)
            .bind(Json(completion_date))
            .bind(guard.lead_id.as_deref())
            .bind(guard.require_active)
            .fetch_optional(self.repository.pool())
            .await?;

        match row {
            Some(Json(updated)) => Ok(GuardedUpdate::Applied(updated)),
            None => self.classify_miss(id).await,
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.repository.delete(id).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(self.repository.pool()).await
    }
}
