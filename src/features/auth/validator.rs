use super::model::AuthenticatedUser;
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;

use super::jwks::JwksClient;

/// Where token signing keys come from
pub enum KeySource {
    /// HS256 shared secret
    Secret(DecodingKey),
    /// RS256 keys published by the issuer
    Jwks(Arc<JwksClient>),
}

pub struct JwtValidator {
    keys: KeySource,
    issuer: Option<String>,
    audience: Option<String>,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(rename = "accountId", default)]
    account_id: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(keys: KeySource, issuer: Option<String>, audience: Option<String>, leeway: u64) -> Self {
        Self {
            keys,
            issuer,
            audience,
            leeway,
        }
    }

    /// Build a validator from auth configuration; a shared secret wins over JWKS
    pub fn from_config(config: &AuthConfig) -> Result<Self, String> {
        let keys = match (&config.jwt_secret, &config.issuer) {
            (Some(secret), _) => KeySource::Secret(DecodingKey::from_secret(secret.as_bytes())),
            (None, Some(issuer)) => {
                KeySource::Jwks(Arc::new(JwksClient::new(issuer, config.jwks_cache_ttl)))
            }
            (None, None) => return Err("No token signing key configured".to_string()),
        };

        Ok(Self::new(
            keys,
            config.issuer.clone(),
            config.audience.clone(),
            config.jwt_leeway.as_secs(),
        ))
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| unauthorized(e.to_string()))?;

        let (decoding_key, algorithm) = match &self.keys {
            KeySource::Secret(key) => (key.clone(), Algorithm::HS256),
            KeySource::Jwks(client) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| unauthorized("Missing kid in token header"))?;
                let key = client
                    .get_key(kid)
                    .await
                    .map_err(|e| unauthorized(e.to_string()))?;
                (key, Algorithm::RS256)
            }
        };

        if header.alg != algorithm {
            return Err(unauthorized(format!(
                "Unsupported algorithm: {:?}. Only {:?} is allowed",
                header.alg, algorithm
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| unauthorized(e.to_string()))?
            .claims;

        let account_id = claims.account_id.unwrap_or_else(|| claims.sub.clone());

        Ok(AuthenticatedUser {
            account_id,
            sub: claims.sub,
            roles: claims.roles,
        })
    }
}

fn unauthorized(reason: impl std::fmt::Display) -> AppError {
    tracing::debug!("Token rejected: {}", reason);
    AppError::Unauthorized("Invalid or expired token".to_string())
}
