pub mod access;
pub mod benchmark_service;
pub mod enrichment;
pub mod error;
pub mod lifecycle;
pub mod preference_service;
pub mod project_service;
pub mod user_service;

pub use benchmark_service::BenchmarkService;
pub use error::{ServiceError, ServiceResult};
pub use preference_service::PreferenceService;
pub use project_service::ProjectService;
pub use user_service::UserService;

use uuid::Uuid;

/// Parses a path id, reporting malformed input as an invalid argument.
pub(crate) fn parse_id(kind: &str, raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidArgument(format!("invalid {} id: {}", kind, raw)))
}
