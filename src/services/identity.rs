use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Principal, Role};

/// Errors that can occur while resolving a principal
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Identity provider returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),
}

/// Resolves a bearer credential into the authenticated principal
///
/// `Ok(None)` means the caller is anonymous: no session, an expired or forged
/// token, or an account without a role. Errors are reserved for the provider
/// itself being unreachable.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_principal(&self, credential: &str) -> Result<Option<Principal>, IdentityError>;
}

/// Elevate configured administrator emails to the admin role
pub fn apply_admin_override(mut principal: Principal, admin_emails: &[String]) -> Principal {
    let is_admin = principal
        .email
        .as_deref()
        .map(|email| admin_emails.iter().any(|admin| admin.eq_ignore_ascii_case(email)))
        .unwrap_or(false);

    if is_admin {
        principal.role = Role::Admin;
    }
    principal
}

/// Claims carried by tokens issued for this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

/// Validates HS256 session tokens locally
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    admin_emails: Vec<String>,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, admin_emails: Vec<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            admin_emails,
        }
    }

    /// Issue a token for `principal` valid for `ttl`
    pub fn issue(&self, principal: &Principal, ttl: chrono::Duration) -> Result<String, IdentityError> {
        let role = match principal.role {
            Role::Donor => "donor",
            Role::Recipient => "recipient",
            Role::Admin => "admin",
        };

        let claims = TokenClaims {
            sub: principal.id.clone(),
            role: role.to_string(),
            email: principal.email.clone(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn current_principal(&self, credential: &str) -> Result<Option<Principal>, IdentityError> {
        let claims = match decode::<TokenClaims>(credential, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                return Ok(None);
            }
        };

        let Some(role) = Role::parse(&claims.role) else {
            tracing::warn!("Token for {} carries unknown role '{}'", claims.sub, claims.role);
            return Ok(None);
        };

        let principal = Principal {
            id: claims.sub,
            role,
            email: claims.email,
        };

        Ok(Some(apply_admin_override(principal, &self.admin_emails)))
    }
}
