//! Role checks and role-derived project scopes.
//!
//! Every decision is made from the [`Caller`] handed in with the request;
//! nothing is cached between calls.

use crate::database::models::Project;
use crate::database::project_store::MutationGuard;
use crate::filter::ProjectScope;
use crate::services::error::ServiceError;
use crate::types::{Caller, Role};

/// Roles that may read projects at all.
pub const READ_ROLES: &[Role] = &[Role::Admin, Role::Member, Role::Client];

/// Roles that may update metrics or complete a project.
pub const LEAD_ROLES: &[Role] = &[Role::Admin, Role::Member];

/// Which projects `caller` may list. Admin wins over member, member over client.
pub fn scope_for(caller: &Caller) -> Result<ProjectScope, ServiceError> {
    match caller.known_roles().first() {
        Some(Role::Admin) => Ok(ProjectScope::AllProjects),
        Some(Role::Member) => Ok(ProjectScope::LedOrMemberOf(caller.subject_id.clone())),
        Some(Role::Client) => Ok(ProjectScope::RepresentedBy(caller.subject_id.clone())),
        None => Err(ServiceError::Forbidden("no recognised role".to_string())),
    }
}

pub fn require_any(caller: &Caller, roles: &[Role]) -> Result<(), ServiceError> {
    if caller.has_any_role(roles) {
        Ok(())
    } else {
        let wanted: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(ServiceError::Forbidden(format!("requires one of: {}", wanted.join(", "))))
    }
}

/// Guard for lead-restricted mutations. Admins are unconstrained, members
/// must be the project lead.
pub fn lead_guard(caller: &Caller, require_active: bool) -> Result<MutationGuard, ServiceError> {
    require_any(caller, LEAD_ROLES)?;

    let lead_id = if caller.has_role(Role::Admin) {
        None
    } else {
        Some(caller.subject_id.clone())
    };

    Ok(MutationGuard {
        lead_id,
        require_active,
    })
}

/// Explains why `guard` refused `project`. Ownership is reported before state.
pub fn rejection(guard: &MutationGuard, project: &Project) -> ServiceError {
    match guard.lead_id.as_deref() {
        Some(lead) if !project.team.is_lead(lead) => {
            ServiceError::Forbidden("only the project lead may change this project".to_string())
        }
        _ => ServiceError::Conflict("project is completed".to_string()),
    }
}
