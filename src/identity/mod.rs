pub mod auth0;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use auth0::Auth0IdentityLookup;
pub use memory::StaticIdentityLookup;

/// A user profile as held by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    pub id: String,
    /// `member` or `client`
    #[serde(rename = "type")]
    pub user_type: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub organisation: String,
    pub client_role: String,
    pub last_access: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("identity {0} not found")]
    NotFound(String),

    #[error("identity provider timed out")]
    Timeout,

    #[error("identity provider returned status {status}")]
    Status { status: u16 },

    #[error("identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the external identity provider. Every call is a remote
/// round trip; nothing is cached.
#[async_trait]
pub trait IdentityLookup: Send + Sync + 'static {
    async fn list_all(&self) -> Result<Vec<Identity>, IdentityError>;

    async fn get_by_id(&self, id: &str) -> Result<Identity, IdentityError>;
}

/// Point-in-time view of every identity, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    by_id: HashMap<String, Identity>,
}

impl IdentitySnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Identity> {
        self.by_id.get(id)
    }
}

impl FromIterator<Identity> for IdentitySnapshot {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        Self {
            by_id: iter.into_iter().map(|identity| (identity.id.clone(), identity)).collect(),
        }
    }
}

impl From<Vec<Identity>> for IdentitySnapshot {
    fn from(identities: Vec<Identity>) -> Self {
        identities.into_iter().collect()
    }
}
