// Route handlers. Each is a thin adapter: extract, call the service, wrap
// the result in the response envelope.
pub mod benchmarks;
pub mod preferences;
pub mod projects;
pub mod system;
pub mod users;
