use chrono::{DateTime, Utc};
use futures::future::join;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Metrics, Project, ProjectStatus};
use crate::database::project_store::{GuardedUpdate, ProjectStore};
use crate::identity::{IdentityLookup, IdentitySnapshot};
use crate::services::access::{self, READ_ROLES};
use crate::services::enrichment::{enrich, enrich_for_list};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::lifecycle::is_visible;
use crate::services::parse_id;
use crate::types::{Caller, Role};

/// Project retrieval and mutation with role checks, identity enrichment and
/// visibility expiry.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
    identity: Arc<dyn IdentityLookup>,
    identity_timeout: Duration,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>, identity: Arc<dyn IdentityLookup>, identity_timeout: Duration) -> Self {
        Self {
            store,
            identity,
            identity_timeout,
        }
    }

    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.store.ping().await?)
    }

    /// Projects in the caller's scope that have not expired at `now`, with
    /// only the lead's name filled in.
    pub async fn list_projects(&self, caller: &Caller, now: DateTime<Utc>) -> ServiceResult<Vec<Project>> {
        let scope = access::scope_for(caller)?;

        let mut projects = self.store.find_many(&scope).await?;
        projects.retain(|project| is_visible(project, now));

        if !projects.is_empty() {
            let identities = self.snapshot().await;
            for project in projects.iter_mut() {
                enrich_for_list(project, &identities);
            }
        }

        Ok(projects)
    }

    pub async fn get_project(&self, caller: &Caller, id: &str) -> ServiceResult<Project> {
        access::require_any(caller, READ_ROLES)?;
        let id = parse_id("project", id)?;

        // store read and identity fetch run concurrently
        let (found, identities) = join(self.store.find(id), self.snapshot()).await;
        let mut project = found?.ok_or_else(|| ServiceError::NotFound(format!("project {}", id)))?;

        enrich(&mut project, &identities);
        Ok(project)
    }

    /// Stores a new active project under a fresh id.
    pub async fn create_project(&self, caller: &Caller, mut project: Project) -> ServiceResult<Project> {
        access::require_any(caller, &[Role::Admin])?;
        project.validate()?;

        let id = Uuid::new_v4();
        project.id = Some(id);
        project.status = ProjectStatus::Active;
        project.completion_date = None;

        self.store.insert(&project).await?;
        info!(project_id = %id, subject = %caller.subject_id, "Created project");
        Ok(project)
    }

    /// Replaces every field except id, status and completion date.
    pub async fn update_project(&self, caller: &Caller, id: &str, mut project: Project) -> ServiceResult<Project> {
        access::require_any(caller, &[Role::Admin])?;
        let id = parse_id("project", id)?;
        project.validate()?;
        project.id = Some(id);

        let stored = self
            .store
            .replace(id, &project)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("project {}", id)))?;

        info!(project_id = %id, subject = %caller.subject_id, "Updated project");
        Ok(self.enriched(stored).await)
    }

    /// Replaces the metrics of an active project. Members must lead it.
    pub async fn update_metrics(&self, caller: &Caller, id: &str, metrics: Metrics) -> ServiceResult<Metrics> {
        let guard = access::lead_guard(caller, true)?;
        let id = parse_id("project", id)?;

        // Ownership and state outrank payload errors
        if let Err(errors) = metrics.validate() {
            let current = self
                .store
                .find(id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("project {}", id)))?;
            if !guard.admits(&current) {
                return Err(access::rejection(&guard, &current));
            }
            return Err(errors.into());
        }

        match self.store.set_metrics(id, &metrics, &guard).await? {
            GuardedUpdate::Applied(project) => {
                info!(project_id = %id, subject = %caller.subject_id, "Updated project metrics");
                Ok(project.metrics)
            }
            GuardedUpdate::Rejected(project) => Err(access::rejection(&guard, &project)),
            GuardedUpdate::Missing => Err(ServiceError::NotFound(format!("project {}", id))),
        }
    }

    /// Completes a project. Calling it again moves the completion date.
    pub async fn mark_completed(
        &self,
        caller: &Caller,
        id: &str,
        completion_date: DateTime<Utc>,
    ) -> ServiceResult<Project> {
        let guard = access::lead_guard(caller, false)?;
        let id = parse_id("project", id)?;

        match self.store.mark_completed(id, completion_date, &guard).await? {
            GuardedUpdate::Applied(project) => {
                info!(project_id = %id, %completion_date, subject = %caller.subject_id, "Marked project completed");
                Ok(self.enriched(project).await)
            }
            GuardedUpdate::Rejected(project) => Err(access::rejection(&guard, &project)),
            GuardedUpdate::Missing => Err(ServiceError::NotFound(format!("project {}", id))),
        }
    }

    pub async fn delete_project(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        access::require_any(caller, &[Role::Admin])?;
        let id = parse_id("project", id)?;

        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(format!("project {}", id)));
        }
        info!(project_id = %id, subject = %caller.subject_id, "Deleted project");
        Ok(())
    }

    async fn enriched(&self, mut project: Project) -> Project {
        let identities = self.snapshot().await;
        enrich(&mut project, &identities);
        project
    }

    /// Every identity, or an empty snapshot when the provider fails or is
    /// slower than the configured timeout.
    async fn snapshot(&self) -> IdentitySnapshot {
        match tokio::time::timeout(self.identity_timeout, self.identity.list_all()).await {
            Ok(Ok(identities)) => IdentitySnapshot::from(identities),
            Ok(Err(e)) => {
                warn!(error = %e, "Identity lookup failed, returning projects without display fields");
                IdentitySnapshot::empty()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.identity_timeout.as_millis() as u64,
                    "Identity lookup timed out, returning projects without display fields"
                );
                IdentitySnapshot::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryProjectStore;
    use crate::identity::StaticIdentityLookup;
    use crate::testing::{admin, client, identity, member, sample_project};
    use chrono::TimeZone;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn service_with(store: MemoryProjectStore, lookup: StaticIdentityLookup) -> ProjectService {
        ProjectService::new(Arc::new(store), Arc::new(lookup), TIMEOUT)
    }

    fn directory() -> StaticIdentityLookup {
        StaticIdentityLookup::new(vec![identity("lead-1", "Alice"), identity("client-1", "Carol")])
    }

    async fn seeded(projects: Vec<Project>) -> (ProjectService, Vec<Uuid>) {
        let store = MemoryProjectStore::new().with_projects(projects);
        let ids = store
            .find_many(&crate::filter::ProjectScope::AllProjects)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|p| p.id)
            .collect();
        (service_with(store, directory()), ids)
    }

    fn led_by(lead: &str, client_rep: &str) -> Project {
        let mut project = sample_project(lead, client_rep);
        project.name = format!("{} / {}", lead, client_rep);
        project
    }

    #[tokio::test]
    async fn listing_matches_each_role_scope() {
        let mut with_member = led_by("lead-2", "client-2");
        with_member.team.team_members = vec![crate::database::models::Member::with_id("lead-1")];
        let (service, _) = seeded(vec![led_by("lead-1", "client-1"), with_member, led_by("lead-3", "client-3")]).await;
        let now = Utc::now();

        assert_eq!(service.list_projects(&admin("root"), now).await.unwrap().len(), 3);

        let mine = service.list_projects(&member("lead-1"), now).await.unwrap();
        let mut names: Vec<String> = mine.into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["lead-1 / client-1", "lead-2 / client-2"]);

        let theirs = service.list_projects(&client("client-3"), now).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].name, "lead-3 / client-3");

        let nobody = Caller::new("x", Vec::<String>::new());
        assert!(matches!(
            service.list_projects(&nobody, now).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn completed_project_drops_out_after_its_window() {
        let mut project = led_by("lead-1", "client-1");
        project.scope.remains_accessible_for_n_days = 30;
        let (service, ids) = seeded(vec![project]).await;
        let day0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        service
            .mark_completed(&member("lead-1"), &ids[0].to_string(), day0)
            .await
            .unwrap();

        let day29 = day0 + chrono::Duration::days(29);
        let day31 = day0 + chrono::Duration::days(31);
        assert_eq!(service.list_projects(&member("lead-1"), day29).await.unwrap().len(), 1);
        assert!(service.list_projects(&member("lead-1"), day31).await.unwrap().is_empty());
        assert!(service.list_projects(&admin("root"), day31).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_names_only_the_lead() {
        let (service, _) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let listed = service.list_projects(&admin("root"), Utc::now()).await.unwrap();

        assert_eq!(listed[0].team.project_lead.full_name, "Alice");
        assert!(listed[0].client_representative.full_name.is_empty());
    }

    #[tokio::test]
    async fn get_project_enriches_from_identity_snapshot() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1"), led_by("u-unknown", "client-1")]).await;

        for id in ids {
            let project = service.get_project(&client("client-1"), &id.to_string()).await.unwrap();
            if project.team.project_lead.id == "lead-1" {
                assert_eq!(project.team.project_lead.full_name, "Alice");
            } else {
                assert!(project.team.project_lead.full_name.is_empty());
            }
            assert_eq!(project.client_representative.full_name, "Carol");
        }
    }

    #[tokio::test]
    async fn identity_outage_degrades_to_bare_ids() {
        let store = MemoryProjectStore::new().with_projects(vec![led_by("lead-1", "client-1")]);
        let failing = service_with(store.clone(), StaticIdentityLookup::failing());
        let slow = service_with(store, directory().with_delay(Duration::from_secs(5)));

        for service in [failing, slow] {
            let listed = service.list_projects(&admin("root"), Utc::now()).await.unwrap();
            assert_eq!(listed.len(), 1);
            assert!(listed[0].team.project_lead.full_name.is_empty());

            let id = listed[0].id.unwrap().to_string();
            let project = service.get_project(&admin("root"), &id).await.unwrap();
            assert!(project.team.project_lead.full_name.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids() {
        let (service, _) = seeded(vec![]).await;

        assert!(matches!(
            service.get_project(&admin("root"), "not-a-uuid").await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.get_project(&admin("root"), &Uuid::new_v4().to_string()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_project(&admin("root"), &Uuid::new_v4().to_string()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_assigns_id_and_resets_lifecycle() {
        let (service, _) = seeded(vec![]).await;
        let mut payload = led_by("lead-1", "client-1");
        let client_supplied = Uuid::new_v4();
        payload.id = Some(client_supplied);
        payload.status = ProjectStatus::Completed;
        payload.completion_date = Some(Utc::now());

        let created = service.create_project(&admin("root"), payload).await.unwrap();
        assert_ne!(created.id, Some(client_supplied));
        assert_eq!(created.status, ProjectStatus::Active);
        assert!(created.completion_date.is_none());

        let fetched = service
            .get_project(&admin("root"), &created.id.unwrap().to_string())
            .await
            .unwrap();
        assert_eq!(fetched.name, created.name);
    }

    #[tokio::test]
    async fn create_validates_and_requires_admin() {
        let (service, _) = seeded(vec![]).await;

        let err = service
            .create_project(&member("lead-1"), led_by("lead-1", "client-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let mut invalid = led_by("lead-1", "client-1");
        invalid.name.clear();
        match service.create_project(&admin("root"), invalid).await {
            Err(ServiceError::ValidationFailed(errors)) => assert!(errors.get("name").is_some()),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_keeps_completion_state() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let id = ids[0].to_string();
        let done = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        service.mark_completed(&admin("root"), &id, done).await.unwrap();

        let mut payload = led_by("lead-1", "client-1");
        payload.name = "Renamed".to_string();
        payload.id = Some(Uuid::new_v4());
        let updated = service.update_project(&admin("root"), &id, payload).await.unwrap();

        assert_eq!(updated.id, Some(ids[0]));
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, ProjectStatus::Completed);
        assert_eq!(updated.completion_date, Some(done));
    }

    #[tokio::test]
    async fn metrics_on_completed_project_conflict() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let id = ids[0].to_string();
        service.mark_completed(&admin("root"), &id, Utc::now()).await.unwrap();

        let mut metrics = Metrics::default();
        metrics.key_cost_drivers_base_value = 10.0;
        for caller in [admin("root"), member("lead-1")] {
            for payload in [Metrics::default(), metrics.clone()] {
                assert!(matches!(
                    service.update_metrics(&caller, &id, payload).await,
                    Err(ServiceError::Conflict(_))
                ));
            }
        }
    }

    #[tokio::test]
    async fn only_the_lead_member_may_mutate() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let id = ids[0].to_string();
        let stranger = member("lead-2");

        assert!(matches!(
            service.update_metrics(&stranger, &id, Metrics::default()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.mark_completed(&stranger, &id, Utc::now()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.update_metrics(&client("client-1"), &id, Metrics::default()).await,
            Err(ServiceError::Forbidden(_))
        ));

        let lead = member("lead-1");
        let mut metrics = Metrics::default();
        metrics.progress_to_date.quantification = 40;
        let stored = service.update_metrics(&lead, &id, metrics).await.unwrap();
        assert_eq!(stored.progress_to_date.quantification, 40);

        let completed = service.mark_completed(&lead, &id, Utc::now()).await.unwrap();
        assert_eq!(completed.status, ProjectStatus::Completed);
    }

    #[tokio::test]
    async fn team_members_who_do_not_lead_cannot_mutate() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let id = ids[0].to_string();
        let crew = member("lead-1-crew");

        // Listed on the team, so the project is visible to them
        assert_eq!(service.list_projects(&crew, Utc::now()).await.unwrap().len(), 1);

        assert!(matches!(
            service.update_metrics(&crew, &id, Metrics::default()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.mark_completed(&crew, &id, Utc::now()).await,
            Err(ServiceError::Forbidden(_))
        ));

        let untouched = service.get_project(&admin("root"), &id).await.unwrap();
        assert_eq!(untouched.status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn invalid_metrics_report_ownership_and_state_first() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1"), led_by("lead-1", "client-2")]).await;
        let (active, completed) = (ids[0].to_string(), ids[1].to_string());
        service.mark_completed(&admin("root"), &completed, Utc::now()).await.unwrap();

        let mut invalid = Metrics::default();
        invalid
            .benchmarking
            .benchmarks
            .push(crate::database::models::metrics::ProjectBenchmark::default());

        for caller in [admin("root"), member("lead-1")] {
            assert!(matches!(
                service.update_metrics(&caller, &completed, invalid.clone()).await,
                Err(ServiceError::Conflict(_))
            ));
        }
        for id in [&active, &completed] {
            assert!(matches!(
                service.update_metrics(&member("lead-9"), id, invalid.clone()).await,
                Err(ServiceError::Forbidden(_))
            ));
        }
        assert!(matches!(
            service.update_metrics(&admin("root"), &Uuid::new_v4().to_string(), invalid.clone()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.update_metrics(&member("lead-1"), &active, invalid).await,
            Err(ServiceError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn completing_twice_moves_the_date() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let id = ids[0].to_string();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        service.mark_completed(&admin("root"), &id, first).await.unwrap();
        let again = service.mark_completed(&admin("root"), &id, second).await.unwrap();

        assert_eq!(again.status, ProjectStatus::Completed);
        assert_eq!(again.completion_date, Some(second));
    }

    #[tokio::test]
    async fn metrics_with_blank_benchmark_are_rejected() {
        let (service, ids) = seeded(vec![led_by("lead-1", "client-1")]).await;
        let mut metrics = Metrics::default();
        metrics
            .benchmarking
            .benchmarks
            .push(crate::database::models::metrics::ProjectBenchmark::default());

        match service.update_metrics(&admin("root"), &ids[0].to_string(), metrics).await {
            Err(ServiceError::ValidationFailed(errors)) => {
                assert_eq!(errors.get("benchmark-0"), Some("benchmark is required"))
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
