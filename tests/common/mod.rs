#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use project_dashboard::app::{app, AppState, Backends};
use project_dashboard::auth::{generate_jwt, TokenVerifier};
use project_dashboard::config::{AppConfig, SecurityConfig};
use project_dashboard::database::{MemoryBenchmarkStore, MemoryPreferenceStore, MemoryProjectStore};
use project_dashboard::identity::{Identity, StaticIdentityLookup};

/// An API instance served from memory on its own port.
pub struct TestApp {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub identities: StaticIdentityLookup,
    security: SecurityConfig,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signed bearer token for `subject` holding `roles`.
    pub fn token(&self, subject: &str, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        generate_jwt(&self.security, subject, &roles).expect("sign test token")
    }

    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn put(&self, path: &str, token: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn patch(&self, path: &str, token: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub fn directory() -> Vec<Identity> {
    vec![
        person("lead-1", "Alice Lead", "member"),
        person("lead-2", "Bob Lead", "member"),
        person("crew-1", "Mia Crew", "member"),
        person("client-1", "Carol Client", "client"),
    ]
}

pub fn person(id: &str, full_name: &str, user_type: &str) -> Identity {
    Identity {
        id: id.to_string(),
        user_type: user_type.to_string(),
        full_name: full_name.to_string(),
        email: format!("{}@example.com", id),
        ..Default::default()
    }
}

/// Spawns the router on a free port, backed by in-memory stores.
pub async fn spawn_app() -> Result<TestApp> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = AppConfig::development();
    let mut security = config.security.clone();
    security.jwt_secret = "integration-test-secret".to_string();
    security.jwt_public_key = None;
    security.jwt_issuer = None;
    security.jwt_audience = None;

    let identities = StaticIdentityLookup::new(directory());
    let backends = Backends {
        projects: Arc::new(MemoryProjectStore::new()),
        benchmarks: Arc::new(MemoryBenchmarkStore::new()),
        preferences: Arc::new(MemoryPreferenceStore::new()),
        identity: Arc::new(identities.clone()),
    };
    let verifier = TokenVerifier::from_config(&security)?;
    let state = AppState::new(backends, verifier, Duration::from_millis(500));
    let router = app(state, &config.api, &security);

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let test_app = TestApp {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        identities,
        security,
    };
    test_app.wait_ready(Duration::from_secs(5)).await?;
    Ok(test_app)
}

/// A complete project payload accepted by create and update.
pub fn project_payload(name: &str, lead: &str, client_rep: &str) -> Value {
    json!({
        "name": name,
        "client": "Department of Transport",
        "region": "Metro North",
        "ciProjectNumber": "CI-2041",
        "clientProjectNumber": "DOT-118",
        "clientRepresentative": { "id": client_rep },
        "team": {
            "projectLead": { "id": lead },
            "teamMembers": [ { "id": "crew-1" } ]
        },
        "scope": {
            "quantification": true,
            "costEstimation": true,
            "probabilisticRiskAssessment": false,
            "basisOfEstimateReport": true,
            "numberOfMilestones": 4,
            "estimatedCompletionDate": "2025-12-01T00:00:00Z",
            "remainsAccessibleForNDays": 30
        },
        "startDate": "2024-02-01T00:00:00Z"
    })
}

pub fn benchmark_payload(name: &str) -> Value {
    json!({
        "name": name,
        "geographicLocation": "NSW",
        "totalProjectCostP90": 410.0,
        "totalConstructionCostPerLaneKm": 12.5,
        "cubicMetreRateForEarthworksPerM3": 38.0,
        "squareMetreRateForPavementPerBridgePerM2": 295.0
    })
}
