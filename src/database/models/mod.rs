pub mod benchmark;
pub mod metrics;
pub mod preference;
pub mod project;
pub mod validation;

pub use benchmark::Benchmark;
pub use metrics::Metrics;
pub use project::{ClientRepresentative, Member, Project, ProjectStatus, ProjectTeam, ScopeOfEngagement};
pub use validation::ValidationErrors;
