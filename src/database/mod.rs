pub mod benchmark_store;
pub mod manager;
pub mod memory;
pub mod models;
pub mod preference_store;
pub mod project_store;
pub mod repository;

pub use benchmark_store::{BenchmarkStore, PgBenchmarkStore};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryBenchmarkStore, MemoryPreferenceStore, MemoryProjectStore};
pub use preference_store::{PgPreferenceStore, PreferenceStore};
pub use project_store::{GuardedUpdate, MutationGuard, PgProjectStore, ProjectStore};
