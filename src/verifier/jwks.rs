//! JWKS-backed ID token verifier.
//!
//! Keys are fetched from the provider's JWKS endpoint and cached per JWKS URI.
//! An unknown `kid` forces a refresh so key rotation is picked up without a
//! restart, at most once per cooldown period per JWKS URI. When no JWKS URI is configured it is discovered once from
//! `{issuer}/.well-known/openid-configuration`.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, RwLock};

use super::IdTokenVerifier;
use crate::claims::RawClaims;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_LEEWAY: u64 = 60;
const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

struct CachedJwks {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
    ttl: Duration,
}

impl std::fmt::Debug for CachedJwks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedJwks")
            .field("keys_count", &self.keys.len())
            .field("fetched_at", &self.fetched_at)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CachedJwks {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }

    fn is_fresh(&self, cooldown: Duration) -> bool {
        self.fetched_at.elapsed() < cooldown
    }
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kid: Option<String>,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

fn verification_failed(message: impl Into<String>) -> Error {
    Error::TokenVerificationFailed(message.into())
}

/// Verifies RS256, RS384 and RS512 ID tokens against a JWKS endpoint.
///
/// Checks the signature, `exp` (with leeway), `aud` against the client ID
/// and, when an issuer is configured, `iss`. Cloning is cheap and clones
/// share the key cache.
///
/// # Example
///
/// ```rust,no_run
/// use gexec_authn::verifier::{IdTokenVerifier, JwksVerifier};
///
/// # async fn example(id_token: &str) -> gexec_authn::Result<()> {
/// let verifier = JwksVerifier::new(reqwest::Client::new(), "gexec")
///     .with_issuer("https://sso.example.com/realms/main");
///
/// let claims = verifier.verify(id_token).await?;
/// println!("subject: {:?}", claims.string("sub"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JwksVerifier {
    audience: String,
    issuer: Option<String>,
    jwks_uri: Option<String>,
    discovered_uri: Arc<OnceCell<String>>,
    /// JWKS URI -> cached keys
    jwks_cache: Arc<RwLock<HashMap<String, CachedJwks>>>,
    http_client: reqwest::Client,
    cache_ttl: Duration,
    refresh_cooldown: Duration,
    leeway: u64,
}

impl JwksVerifier {
    /// Create a verifier for tokens issued to `audience`.
    ///
    /// An issuer or a JWKS URI must be set before the first call.
    pub fn new(http_client: reqwest::Client, audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuer: None,
            jwks_uri: None,
            discovered_uri: Arc::new(OnceCell::new()),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            http_client,
            cache_ttl: DEFAULT_CACHE_TTL,
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
            leeway: DEFAULT_LEEWAY,
        }
    }

    /// Build a verifier from an OIDC provider configuration.
    pub fn from_config(config: &ProviderConfig, http_client: reqwest::Client) -> Result<Self> {
        if config.issuer.is_none() && config.endpoints.jwks.is_none() {
            return Err(Error::Config(format!(
                "provider '{}': oidc driver requires an issuer or a jwks endpoint",
                config.name
            )));
        }
        if config.client_id.trim().is_empty() {
            return Err(Error::Config(format!(
                "provider '{}': oidc driver requires a client_id",
                config.name
            )));
        }

        let mut verifier = Self::new(http_client, config.client_id.clone());
        verifier.issuer = config.issuer.clone();
        verifier.jwks_uri = config.endpoints.jwks.clone();
        Ok(verifier)
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Use a fixed JWKS URI instead of discovery.
    pub fn with_jwks_uri(mut self, jwks_uri: impl Into<String>) -> Self {
        self.jwks_uri = Some(jwks_uri.into());
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Minimum age of the cached key set before an unknown `kid` may
    /// trigger another fetch.
    pub fn with_refresh_cooldown(mut self, refresh_cooldown: Duration) -> Self {
        self.refresh_cooldown = refresh_cooldown;
        self
    }

    /// Clock skew tolerance in seconds.
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// Drop every cached key set.
    pub async fn clear_cache(&self) {
        self.jwks_cache.write().await.clear();
    }

    /// Number of cached JWKS URIs.
    pub async fn cache_size(&self) -> usize {
        self.jwks_cache.read().await.len()
    }

    async fn resolve_jwks_uri(&self) -> Result<String> {
        if let Some(uri) = &self.jwks_uri {
            return Ok(uri.clone());
        }

        let issuer = self
            .issuer
            .as_deref()
            .ok_or_else(|| Error::Config("no issuer or jwks endpoint configured".into()))?;

        self.discovered_uri
            .get_or_try_init(|| self.discover(issuer))
            .await
            .cloned()
    }

    async fn discover(&self, issuer: &str) -> Result<String> {
        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );
        tracing::debug!(url = %discovery_url, "Fetching OIDC discovery");

        let response = self
            .http_client
            .get(&discovery_url)
            .send()
            .await
            .map_err(|e| verification_failed(format!("failed to fetch discovery: {}", e)))?;

        if !response.status().is_success() {
            return Err(verification_failed(format!(
                "discovery endpoint returned status {}",
                response.status()
            )));
        }

        let document: DiscoveryDocument = response
            .json()
            .await
            .map_err(|e| verification_failed(format!("failed to parse discovery: {}", e)))?;

        Ok(document.jwks_uri)
    }

    async fn get_key(&self, jwks_uri: &str, kid: &str) -> Result<DecodingKey> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(cached) = cache.get(jwks_uri) {
                if !cached.is_expired() {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                    if cached.is_fresh(self.refresh_cooldown) {
                        tracing::debug!(kid = %kid, "Unknown key id within refresh cooldown");
                        return Err(verification_failed(format!("unknown key id '{}'", kid)));
                    }
                }
            }
        }

        self.refresh_jwks(jwks_uri).await?;

        let cache = self.jwks_cache.read().await;
        cache
            .get(jwks_uri)
            .and_then(|cached| cached.keys.get(kid))
            .cloned()
            .ok_or_else(|| verification_failed(format!("unknown key id '{}'", kid)))
    }

    async fn refresh_jwks(&self, jwks_uri: &str) -> Result<()> {
        tracing::debug!(jwks_uri = %jwks_uri, "Fetching JWKS");

        let response = self
            .http_client
            .get(jwks_uri)
            .send()
            .await
            .map_err(|e| verification_failed(format!("failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(verification_failed(format!(
                "JWKS endpoint returned status {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| verification_failed(format!("failed to parse JWKS: {}", e)))?;

        let mut keys = HashMap::new();
        for key in jwks.keys.into_iter().filter(|k| k.kty == "RSA") {
            if let (Some(kid), Some(n), Some(e)) = (key.kid, key.n, key.e) {
                match DecodingKey::from_rsa_components(&n, &e) {
                    Ok(decoding_key) => {
                        keys.insert(kid, decoding_key);
                    },
                    Err(err) => {
                        tracing::warn!(kid = %kid, error = %err, "Failed to parse JWK");
                    },
                }
            }
        }

        if keys.is_empty() {
            return Err(verification_failed("no usable keys in JWKS"));
        }

        tracing::info!(jwks_uri = %jwks_uri, keys_count = keys.len(), "Cached JWKS keys");

        self.jwks_cache.write().await.insert(
            jwks_uri.to_string(),
            CachedJwks {
                keys,
                fetched_at: Instant::now(),
                ttl: self.cache_ttl,
            },
        );

        Ok(())
    }
}

#[async_trait]
impl IdTokenVerifier for JwksVerifier {
    async fn verify(&self, id_token: &str) -> Result<RawClaims> {
        let header = decode_header(id_token)
            .map_err(|e| verification_failed(format!("invalid token header: {}", e)))?;

        if !matches!(
            header.alg,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
        ) {
            return Err(verification_failed(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| verification_failed("token missing key id (kid)"))?;

        let jwks_uri = self.resolve_jwks_uri().await?;
        let key = self.get_key(&jwks_uri, &kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.leeway = self.leeway;

        let token_data = decode::<serde_json::Value>(id_token, &key, &validation).map_err(|e| {
            let reason = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => "token expired",
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => "invalid issuer",
                jsonwebtoken::errors::ErrorKind::InvalidAudience => "invalid audience",
                jsonwebtoken::errors::ErrorKind::InvalidSignature => "invalid signature",
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => "token not yet valid",
                _ => "token validation failed",
            };
            verification_failed(reason)
        })?;

        RawClaims::try_from(token_data.claims)
            .map_err(|kind| Error::ClaimsDecodeFailed(format!("expected object, got {}", kind)))
    }
}
