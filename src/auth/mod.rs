use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::types::Caller;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token verification is not configured: set AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY")]
    NotConfigured,

    #[error("invalid signing key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token is missing the {0} claim")]
    MissingClaim(String),
}

/// Checks bearer tokens and turns their claims into a [`Caller`].
///
/// HS256 with the shared secret, or RS256 when a PEM public key is
/// configured. Issuer and audience are checked only when configured.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    roles_claim: String,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("roles_claim", &self.roles_claim)
            .finish()
    }
}

impl TokenVerifier {
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        let (key, algorithm) = match security.jwt_public_key.as_deref() {
            Some(pem) if !pem.trim().is_empty() => (
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(AuthError::InvalidKey)?,
                Algorithm::RS256,
            ),
            _ if !security.jwt_secret.is_empty() => {
                (DecodingKey::from_secret(security.jwt_secret.as_bytes()), Algorithm::HS256)
            }
            _ => return Err(AuthError::NotConfigured),
        };

        let mut validation = Validation::new(algorithm);
        // Configured audience and issuer must be present, not just match when sent
        let mut required = vec!["exp", "sub"];
        if security.jwt_audience.is_some() {
            required.push("aud");
        }
        if security.jwt_issuer.is_some() {
            required.push("iss");
        }
        validation.set_required_spec_claims(&required);
        match security.jwt_audience.as_deref() {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = security.jwt_issuer.as_deref() {
            validation.set_issuer(&[iss]);
        }

        Ok(Self {
            key,
            validation,
            roles_claim: security.roles_claim.clone(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Caller, AuthError> {
        let claims = decode::<Map<String, Value>>(token, &self.key, &self.validation)?.claims;

        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::MissingClaim("sub".to_string()))?;

        // A token without the roles claim authenticates but grants nothing.
        let roles = match claims.get(&self.roles_claim) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };

        Ok(Caller::new(subject, roles))
    }
}

/// Signs an HS256 token for `subject` with `roles`, valid for the
/// configured number of hours. Used for local development and tests.
pub fn generate_jwt(security: &SecurityConfig, subject: &str, roles: &[String]) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let now = Utc::now();
    let mut claims = json!({
        "sub": subject,
        "iat": now.timestamp(),
        "exp": (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp(),
    });
    claims[security.roles_claim.as_str()] = json!(roles);
    if let Some(iss) = &security.jwt_issuer {
        claims["iss"] = json!(iss);
    }
    if let Some(aud) = &security.jwt_audience {
        claims["aud"] = json!(aud);
    }

    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
}
