use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::TokenVerifier;
use crate::config::{ApiConfig, SecurityConfig};
use crate::database::{BenchmarkStore, PreferenceStore, ProjectStore};
use crate::handlers::{benchmarks, preferences, projects, system, users};
use crate::identity::IdentityLookup;
use crate::middleware::jwt_auth_middleware;
use crate::services::{BenchmarkService, PreferenceService, ProjectService, UserService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub benchmarks: BenchmarkService,
    pub users: UserService,
    pub preferences: PreferenceService,
    pub verifier: Arc<TokenVerifier>,
}

/// Backends the services are built on.
pub struct Backends {
    pub projects: Arc<dyn ProjectStore>,
    pub benchmarks: Arc<dyn BenchmarkStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub identity: Arc<dyn IdentityLookup>,
}

impl AppState {
    pub fn new(backends: Backends, verifier: TokenVerifier, identity_timeout: Duration) -> Self {
        Self {
            projects: ProjectService::new(backends.projects, backends.identity.clone(), identity_timeout),
            benchmarks: BenchmarkService::new(backends.benchmarks),
            users: UserService::new(backends.identity, identity_timeout),
            preferences: PreferenceService::new(backends.preferences),
            verifier: Arc::new(verifier),
        }
    }
}

pub fn app(state: AppState, api: &ApiConfig, security: &SecurityConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(security))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes));

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/preferences/organisations", get(preferences::get_organisations))
        // Protected
        .merge(protected_routes(state.clone()))
        .layer(middleware)
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/:id/metrics", put(projects::update_metrics))
        .route("/projects/:id/completed", patch(projects::mark_completed))
        .route(
            "/benchmarks",
            get(benchmarks::list_benchmarks).post(benchmarks::create_benchmark),
        )
        .route(
            "/benchmarks/:id",
            get(benchmarks::get_benchmark)
                .put(benchmarks::update_benchmark)
                .delete(benchmarks::delete_benchmark),
        )
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::get_me))
        .route("/users/:id", get(users::get_user))
        .route(
            "/preferences/organisations",
            post(preferences::add_organisation),
        )
        .route_layer(from_fn_with_state(state.verifier.clone(), jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}
