use std::sync::Arc;
use std::time::Duration;

use crate::identity::{Identity, IdentityLookup};
use crate::services::access;
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::{Caller, Role};

/// Read-only view of the identity provider's user directory. Provider
/// failures are hard errors here.
#[derive(Clone)]
pub struct UserService {
    identity: Arc<dyn IdentityLookup>,
    timeout: Duration,
}

impl UserService {
    pub fn new(identity: Arc<dyn IdentityLookup>, timeout: Duration) -> Self {
        Self { identity, timeout }
    }

    pub async fn list_users(&self, _caller: &Caller) -> ServiceResult<Vec<Identity>> {
        self.bounded(self.identity.list_all()).await
    }

    pub async fn get_me(&self, caller: &Caller) -> ServiceResult<Identity> {
        self.bounded(self.identity.get_by_id(&caller.subject_id)).await
    }

    pub async fn get_user(&self, caller: &Caller, id: &str) -> ServiceResult<Identity> {
        access::require_any(caller, &[Role::Admin])?;
        if id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("user id is empty".to_string()));
        }
        self.bounded(self.identity.get_by_id(id)).await
    }

    async fn bounded<T, F>(&self, call: F) -> ServiceResult<T>
    where
        F: std::future::Future<Output = Result<T, crate::identity::IdentityError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServiceError::Unavailable("identity provider timed out".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentityLookup;
    use crate::testing::{admin, identity, member};

    fn service(lookup: StaticIdentityLookup) -> UserService {
        UserService::new(Arc::new(lookup), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn me_resolves_the_caller_subject() {
        let users = service(StaticIdentityLookup::new(vec![identity("m1", "Mia"), identity("a1", "Ada")]));

        assert_eq!(users.get_me(&member("m1")).await.unwrap().full_name, "Mia");
        assert_eq!(users.list_users(&member("m1")).await.unwrap().len(), 2);
        assert!(matches!(
            users.get_me(&member("ghost")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_user_is_admin_only() {
        let users = service(StaticIdentityLookup::new(vec![identity("m1", "Mia")]));

        assert!(matches!(
            users.get_user(&member("m1"), "m1").await,
            Err(ServiceError::Forbidden(_))
        ));
        assert_eq!(users.get_user(&admin("a1"), "m1").await.unwrap().id, "m1");
    }

    #[tokio::test]
    async fn provider_failures_are_unavailable() {
        let down = service(StaticIdentityLookup::failing());
        assert!(matches!(
            down.list_users(&member("m1")).await,
            Err(ServiceError::Unavailable(_))
        ));

        let slow = service(StaticIdentityLookup::new(vec![]).with_delay(Duration::from_secs(5)));
        assert!(matches!(
            slow.list_users(&member("m1")).await,
            Err(ServiceError::Unavailable(_))
        ));
    }
}
