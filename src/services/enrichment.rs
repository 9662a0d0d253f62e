//! Refreshes the display fields cached on project documents.
//!
//! Stored display fields are never trusted: each function clears them and
//! fills in whatever the snapshot knows. Ids missing from the snapshot end
//! up with only their id.

use crate::database::models::{ClientRepresentative, Member, Project};
use crate::identity::IdentitySnapshot;

/// Full refresh for detail views: client representative, lead and every
/// team member.
pub fn enrich(project: &mut Project, identities: &IdentitySnapshot) {
    enrich_representative(&mut project.client_representative, identities);
    enrich_member(&mut project.team.project_lead, identities);
    for member in project.team.team_members.iter_mut() {
        enrich_member(member, identities);
    }
}

/// Light refresh for listings: only the lead's name is filled in.
pub fn enrich_for_list(project: &mut Project, identities: &IdentitySnapshot) {
    project.clear_display_fields();
    let lead = &mut project.team.project_lead;
    if let Some(identity) = identities.get(&lead.id) {
        lead.full_name = identity.full_name.clone();
    }
}

fn enrich_member(member: &mut Member, identities: &IdentitySnapshot) {
    member.clear_display_fields();
    if let Some(identity) = identities.get(&member.id) {
        member.full_name = identity.full_name.clone();
        member.email = identity.email.clone();
        member.avatar = identity.avatar.clone();
        member.bio = identity.bio.clone();
    }
}

fn enrich_representative(rep: &mut ClientRepresentative, identities: &IdentitySnapshot) {
    rep.clear_display_fields();
    if let Some(identity) = identities.get(&rep.id) {
        rep.full_name = identity.full_name.clone();
        rep.client_role = identity.client_role.clone();
    }
}
