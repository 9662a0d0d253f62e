//! Fixtures shared by unit tests.

use chrono::{TimeZone, Utc};

use crate::database::models::{Benchmark, ClientRepresentative, Member, Project, ProjectTeam, ScopeOfEngagement};
use crate::identity::Identity;
use crate::types::Caller;

/// A valid active project led by `lead_id`, represented by `client_id`,
/// with one extra team member and a 30 day visibility window.
pub fn sample_project(lead_id: &str, client_id: &str) -> Project {
    Project {
        id: None,
        name: "Gateway Upgrade".to_string(),
        client: "Transport".to_string(),
        region: "South East".to_string(),
        ci_project_number: "CI-1001".to_string(),
        client_project_number: "TMR-77".to_string(),
        client_representative: ClientRepresentative::with_id(client_id),
        team: ProjectTeam {
            project_lead: Member::with_id(lead_id),
            team_members: vec![Member::with_id(format!("{}-crew", lead_id))],
        },
        scope: ScopeOfEngagement {
            quantification: true,
            cost_estimation: true,
            number_of_milestones: 3,
            estimated_completion_date: Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).single(),
            remains_accessible_for_n_days: 30,
            ..Default::default()
        },
        start_date: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).single(),
        ..Default::default()
    }
}

pub fn sample_benchmark(name: &str) -> Benchmark {
    Benchmark {
        id: None,
        name: name.to_string(),
        geographic_location: "QLD".to_string(),
        total_project_cost_p90: 120.5,
        total_construction_cost_per_lane_km: 8.25,
        cubic_metre_rate_for_earthworks_per_m3: 42.0,
        square_metre_rate_for_pavement_per_bridge_per_m2: 310.0,
    }
}

pub fn identity(id: &str, full_name: &str) -> Identity {
    Identity {
        id: id.to_string(),
        user_type: "member".to_string(),
        full_name: full_name.to_string(),
        email: format!("{}@example.com", id),
        client_role: "Project Director".to_string(),
        ..Default::default()
    }
}

pub fn admin(id: &str) -> Caller {
    Caller::new(id, ["admin"])
}

pub fn member(id: &str) -> Caller {
    Caller::new(id, ["member"])
}

pub fn client(id: &str) -> Caller {
    Caller::new(id, ["client"])
}
