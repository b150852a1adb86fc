use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Unknown key ids are answered from the cache for this long after a fetch
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(rename = "use", default)]
    key_use: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Fetches and caches the RSA signing keys published at `{issuer}/jwks`
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
    cache_ttl: Duration,
    min_refetch: Duration,
}

impl JwksClient {
    pub fn new(issuer_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: format!("{}/jwks", issuer_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            cache_ttl,
            min_refetch: MIN_REFETCH_INTERVAL.min(cache_ttl),
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        // Miss or stale: the issuer may have rotated keys. The write lock keeps
        // concurrent misses down to a single fetch.
        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.min_refetch {
                return cached
                    .keys
                    .get(kid)
                    .cloned()
                    .ok_or_else(|| JwksError::KeyNotFound(kid.to_string()));
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();

        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, JwksError> {
        tracing::debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::Fetch(format!("HTTP {}", response.status())));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::Parse(e.to_string()))?;

        parse_rsa_keys(set)
    }
}

fn parse_rsa_keys(set: JwkSet) -> Result<HashMap<String, DecodingKey>, JwksError> {
    let mut keys = HashMap::new();

    for jwk in set.keys {
        if jwk.kty != "RSA" || jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }
        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            continue;
        };
        let key = DecodingKey::from_rsa_components(n, e)
            .map_err(|err| JwksError::KeyConversion(err.to_string()))?;
        keys.insert(jwk.kid, key);
    }

    Ok(keys)
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    Fetch(String),

    #[error("Failed to parse JWKS: {0}")]
    Parse(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{serve_jwks, test_jwks, TEST_RSA_KID};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_parse_skips_non_signing_and_non_rsa_keys() {
        let set: JwkSet = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kid": "ec", "kty": "EC", "crv": "P-256", "x": "a", "y": "b" },
                { "kid": "enc", "kty": "RSA", "use": "enc", "n": "AQAB", "e": "AQAB" },
                { "kid": "sig", "kty": "RSA", "use": "sig", "n": "AQAB", "e": "AQAB" }
            ]
        }))
        .unwrap();

        let keys = parse_rsa_keys(set).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("sig"));
    }

    #[test]
    fn test_jwks_url_is_derived_from_issuer() {
        let client = JwksClient::new("https://auth.example/oidc/", Duration::from_secs(60));
        assert_eq!(client.jwks_url, "https://auth.example/oidc/jwks");
    }

    #[tokio::test]
    async fn test_known_key_is_served_from_cache() {
        let (issuer, hits) = serve_jwks(test_jwks()).await;
        let client = JwksClient::new(&issuer, Duration::from_secs(60));

        assert!(client.get_key(TEST_RSA_KID).await.is_ok());
        assert!(client.get_key(TEST_RSA_KID).await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_kid_does_not_refetch_within_interval() {
        let (issuer, hits) = serve_jwks(test_jwks()).await;
        let client = JwksClient::new(&issuer, Duration::from_secs(60));

        for _ in 0..3 {
            let result = client.get_key("rotated-away").await;
            assert!(matches!(result, Err(JwksError::KeyNotFound(_))));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Known keys still resolve from the same fetch
        assert!(client.get_key(TEST_RSA_KID).await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_is_refetched() {
        let (issuer, hits) = serve_jwks(test_jwks()).await;
        let client = JwksClient::new(&issuer, Duration::ZERO);

        assert!(client.get_key(TEST_RSA_KID).await.is_ok());
        assert!(client.get_key(TEST_RSA_KID).await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_issuer_is_fetch_error() {
        let client = JwksClient::new("http://127.0.0.1:1", Duration::from_secs(60));
        let result = client.get_key(TEST_RSA_KID).await;
        assert!(matches!(result, Err(JwksError::Fetch(_))));
    }
}
