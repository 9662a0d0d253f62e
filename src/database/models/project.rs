use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::Metrics;
use super::validation::ValidationErrors;

/// A person attached to a project. Everything except `id` is a display cache
/// refreshed from the identity provider on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Member {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bio: String,
}

impl Member {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn clear_display_fields(&mut self) {
        self.full_name.clear();
        self.email.clear();
        self.avatar.clear();
        self.bio.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRepresentative {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_role: String,
}

impl ClientRepresentative {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn clear_display_fields(&mut self) {
        self.full_name.clear();
        self.client_role.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectTeam {
    pub project_lead: Member,
    pub team_members: Vec<Member>,
}

impl ProjectTeam {
    pub fn is_lead(&self, subject_id: &str) -> bool {
        self.project_lead.id == subject_id
    }

    pub fn includes(&self, subject_id: &str) -> bool {
        self.is_lead(subject_id) || self.team_members.iter().any(|m| m.id == subject_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeOfEngagement {
    pub quantification: bool,
    pub cost_estimation: bool,
    pub probabilistic_risk_assessment: bool,
    pub basis_of_estimate_report: bool,
    pub number_of_milestones: u32,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    /// Days a completed project stays listable after its completion date.
    pub remains_accessible_for_n_days: i64,
}

/// Lifecycle state. Active serializes as the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "")]
    Active,
    #[serde(rename = "completed")]
    Completed,
}

impl ProjectStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, ProjectStatus::Completed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub client: String,
    pub region: String,
    pub ci_project_number: String,
    pub client_project_number: String,
    pub client_representative: ClientRepresentative,
    pub team: ProjectTeam,
    pub scope: ScopeOfEngagement,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    pub metrics: Metrics,
}

impl Project {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require_text("name", &self.name, "project name is required");
        errors.require_text("client", &self.client, "client is required");
        errors.require_text("region", &self.region, "region is required");
        errors.require_text("ciProjectNumber", &self.ci_project_number, "CI project number is required");
        errors.require_text(
            "clientProjectNumber",
            &self.client_project_number,
            "client project number is required",
        );
        errors.require_text(
            "clientRepresentative",
            &self.client_representative.id,
            "client representative is required",
        );
        errors.require_text("projectLead", &self.team.project_lead.id, "project lead is required");

        if self.scope.remains_accessible_for_n_days < 1 {
            errors.add(
                "remainsAccessibleForNDays",
                "remains accessible for n days must be at least 1",
            );
        }
        if self.scope.estimated_completion_date.is_none() {
            errors.add("estimatedCompletionDate", "estimated completion date is required");
        }
        if self.start_date.is_none() {
            errors.add("startDate", "start date is required");
        }

        if let Err(metric_errors) = self.metrics.validate() {
            errors.merge(metric_errors);
        }

        errors.into_result()
    }

    /// Drops every denormalized display field, leaving only ids.
    pub fn clear_display_fields(&mut self) {
        self.client_representative.clear_display_fields();
        self.team.project_lead.clear_display_fields();
        for member in self.team.team_members.iter_mut() {
            member.clear_display_fields();
        }
    }
}
