use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::{Identity, IdentityError, IdentityLookup};

/// Fixed identity directory, optionally slow or failing.
#[derive(Clone, Default)]
pub struct StaticIdentityLookup {
    identities: Arc<RwLock<Vec<Identity>>>,
    failing: bool,
    delay: Option<Duration>,
}

impl StaticIdentityLookup {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self {
            identities: Arc::new(RwLock::new(identities)),
            ..Default::default()
        }
    }

    /// Every call fails as if the provider were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Every call waits `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replaces a profile in place, as an edit at the provider would.
    pub fn upsert(&self, identity: Identity) {
        let mut identities = self.identities.write().unwrap_or_else(PoisonError::into_inner);
        identities.retain(|existing| existing.id != identity.id);
        identities.push(identity);
    }

    async fn respond(&self) -> Result<Vec<Identity>, IdentityError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(IdentityError::Unavailable("static lookup configured to fail".to_string()));
        }
        let identities = self.identities.read().unwrap_or_else(PoisonError::into_inner);
        Ok(identities.clone())
    }
}

#[async_trait]
impl IdentityLookup for StaticIdentityLookup {
    async fn list_all(&self) -> Result<Vec<Identity>, IdentityError> {
        self.respond().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Identity, IdentityError> {
        self.respond()
            .await?
            .into_iter()
            .find(|identity| identity.id == id)
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))
    }
}
