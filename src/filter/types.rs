use crate::database::models::Project;

/// Which projects a caller may list. Closed set, derived from the caller's
/// role, and translated to the store's query language at the repository
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    AllProjects,
    /// Projects where the subject is the lead or a listed team member.
    LedOrMemberOf(String),
    /// Projects where the subject is the client representative.
    RepresentedBy(String),
}

impl ProjectScope {
    /// In-process evaluation of the same predicate the SQL translation
    /// expresses.
    pub fn matches(&self, project: &Project) -> bool {
        match self {
            ProjectScope::AllProjects => true,
            ProjectScope::LedOrMemberOf(subject) => project.team.includes(subject),
            ProjectScope::RepresentedBy(subject) => project.client_representative.id == *subject,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
