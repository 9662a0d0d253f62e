use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{Identity, IdentityError, IdentityLookup};
use crate::config::IdentityConfig;

/// Identity lookup against an Auth0-style management API.
///
/// Each call obtains a client-credentials token and then queries
/// `/api/v2/users`. Both requests share the client's timeout.
pub struct Auth0IdentityLookup {
    client: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    audience: String,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Auth0User {
    user_id: String,
    email: String,
    name: String,
    picture: String,
    last_login: String,
    user_metadata: Auth0UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Auth0UserMetadata {
    user_role: String,
    bio: String,
    organisation: String,
    client_role: String,
}

impl From<Auth0User> for Identity {
    fn from(user: Auth0User) -> Self {
        Identity {
            id: user.user_id,
            user_type: user.user_metadata.user_role,
            full_name: user.name,
            email: user.email,
            avatar: user.picture,
            bio: user.user_metadata.bio,
            organisation: user.user_metadata.organisation,
            client_role: user.user_metadata.client_role,
            last_access: user.last_login,
        }
    }
}

impl Auth0IdentityLookup {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        if config.domain.trim().is_empty() {
            return Err(IdentityError::NotConfigured("IDENTITY_DOMAIN"));
        }
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(IdentityError::NotConfigured("IDENTITY_CLIENT_ID / IDENTITY_CLIENT_SECRET"));
        }

        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: Self::base_url(&config.domain)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            audience: config.audience.clone(),
        })
    }

    /// Accepts a bare tenant domain or a full origin URL.
    fn base_url(domain: &str) -> Result<Url, IdentityError> {
        let raw = if domain.contains("://") {
            domain.to_string()
        } else {
            format!("https://{}/", domain.trim_end_matches('/'))
        };
        Url::parse(&raw).map_err(|_| IdentityError::NotConfigured("IDENTITY_DOMAIN"))
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base_url
            .join(path)
            .map_err(|e| IdentityError::Unavailable(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn token(&self) -> Result<String, IdentityError> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            audience: &self.audience,
            grant_type: "client_credentials",
        };

        let response = self
            .client
            .post(self.endpoint("oauth/token")?)
            .json(&request)
            .send()
            .await
            .map_err(map_transport)?;
        let response = check_status(response)?;

        let token: TokenResponse = response.json().await.map_err(map_transport)?;
        Ok(format!("{} {}", token.token_type, token.access_token))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, IdentityError> {
        let token = self.token().await?;
        debug!(%url, "identity provider request");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, token)
            .send()
            .await
            .map_err(map_transport)?;
        let response = check_status(response)?;

        response.json().await.map_err(map_transport)
    }
}

fn map_transport(err: reqwest::Error) -> IdentityError {
    if err.is_timeout() {
        IdentityError::Timeout
    } else {
        IdentityError::Request(err)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(IdentityError::Status { status: status.as_u16() })
    }
}

#[async_trait]
impl IdentityLookup for Auth0IdentityLookup {
    async fn list_all(&self) -> Result<Vec<Identity>, IdentityError> {
        let users: Vec<Auth0User> = self.get_json(self.endpoint("api/v2/users")?).await?;
        Ok(users.into_iter().map(Identity::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Identity, IdentityError> {
        let mut url = self.endpoint("api/v2/users/")?;
        // push_segment percent-encodes ids such as "auth0|abc"
        url.path_segments_mut()
            .map_err(|_| IdentityError::NotConfigured("IDENTITY_DOMAIN"))?
            .pop_if_empty()
            .push(id);

        match self.get_json::<Auth0User>(url).await {
            Ok(user) => Ok(user.into()),
            Err(IdentityError::Status { status }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(IdentityError::NotFound(id.to_string()))
            }
            Err(other) => Err(other),
        }
    }
}
