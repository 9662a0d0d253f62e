use std::sync::Arc;
use tracing::info;

use crate::database::models::preference::ORGANISATIONS;
use crate::database::models::ValidationErrors;
use crate::database::preference_store::PreferenceStore;
use crate::services::access;
use crate::services::error::ServiceResult;
use crate::types::{Caller, Role};

/// The organisation list offered when assigning client representatives.
#[derive(Clone)]
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Public; an absent document reads as an empty list.
    pub async fn get_organisations(&self) -> ServiceResult<Vec<String>> {
        Ok(self
            .store
            .get(ORGANISATIONS)
            .await?
            .map(|pref| pref.string_list())
            .unwrap_or_default())
    }

    pub async fn add_organisation(&self, caller: &Caller, name: &str) -> ServiceResult<Vec<String>> {
        access::require_any(caller, &[Role::Admin])?;

        let name = name.trim();
        let mut errors = ValidationErrors::new();
        errors.require_text("name", name, "organisation name is required");
        errors.into_result()?;

        let pref = self.store.add_to_list(ORGANISATIONS, name).await?;
        info!(organisation = %name, "Added organisation");
        Ok(pref.string_list())
    }
}
