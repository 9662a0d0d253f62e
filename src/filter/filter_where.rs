use super::types::ProjectScope;

/// JSON paths inside the stored project document.
const LEAD_ID_PATH: &str = "doc #>> '{team,projectLead,id}'";
const TEAM_MEMBERS_PATH: &str = "doc -> 'team' -> 'teamMembers'";
const CLIENT_REP_ID_PATH: &str = "doc #>> '{clientRepresentative,id}'";

/// Builds parameterised WHERE clauses over the JSONB `doc` column.
pub struct FilterWhere {
    param_values: Vec<String>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause (empty for an unrestricted scope) and its params.
    pub fn generate(scope: &ProjectScope, starting_param_index: usize) -> (String, Vec<String>) {
        let mut filter_where = Self::new(starting_param_index);
        let clause = filter_where.build(scope);
        (clause, filter_where.param_values)
    }

    fn build(&mut self, scope: &ProjectScope) -> String {
        match scope {
            ProjectScope::AllProjects => String::new(),
            ProjectScope::LedOrMemberOf(subject) => {
                let p = self.param(subject.clone());
                format!(
                    "({lead} = {p} OR {members} @> jsonb_build_array(jsonb_build_object('id', {p}::text)))",
                    lead = LEAD_ID_PATH,
                    members = TEAM_MEMBERS_PATH,
                    p = p
                )
            }
            ProjectScope::RepresentedBy(subject) => {
                let p = self.param(subject.clone());
                format!("{} = {}", CLIENT_REP_ID_PATH, p)
            }
        }
    }

    fn param(&mut self, value: String) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
