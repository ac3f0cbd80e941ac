//! The per-provider facade that turns a token into a [`User`].

use std::sync::Arc;

use crate::claims::RawClaims;
use crate::config::{Driver, ProviderConfig};
use crate::error::{Error, Result};
use crate::fetch::{primary_verified, ProfileClient};
use crate::mapper::{self, ClaimsMapper};
use crate::token::Token;
use crate::user::{Extraction, User};
use crate::verifier::IdTokenVerifier;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A configured identity provider.
///
/// Immutable after construction; share it behind an [`Arc`]. Each call makes
/// at most two sequential requests (profile, then GitHub emails) and never
/// retries. Dropping the returned future cancels the in-flight request.
///
/// # Example
///
/// ```rust,no_run
/// use gexec_authn::{Driver, Provider, ProviderConfig, Token};
///
/// # async fn example() -> gexec_authn::Result<()> {
/// let provider = Provider::new(ProviderConfig::new("github", Driver::Github))?;
///
/// let user = provider.claims(&Token::bearer("gho_xxx")).await?;
/// println!("{} <{}>", user.login, user.email);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Provider {
    config: Arc<ProviderConfig>,
    client: ProfileClient,
    verifier: Option<Arc<dyn IdTokenVerifier>>,
    mapper: Arc<dyn ClaimsMapper>,
}

impl Provider {
    /// Build a provider with its own HTTP client and, for OIDC, a JWKS verifier.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ProviderConfig) -> ProviderBuilder {
        ProviderBuilder {
            config,
            http_client: None,
            verifier: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn driver(&self) -> Driver {
        self.config.driver
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve the token into a user plus any field-level diagnostics.
    ///
    /// Nothing is logged; use [`Provider::claims`] for the logging variant.
    ///
    /// # Errors
    ///
    /// Only structural failures: a missing or invalid ID token, a failed
    /// profile call or a failed email backfill.
    pub async fn resolve(&self, token: &Token) -> Result<Extraction> {
        let raw = self.fetch_claims(token).await?;
        let mut extraction = self.mapper.extract_user(raw);

        if self.config.driver == Driver::Github && extraction.user.email.is_empty() {
            if let Some(email) = self.backfill_email(token).await? {
                extraction.user.email = email;
            }
        }

        Ok(extraction)
    }

    /// Resolve the token into a user, logging a warning per diagnostic.
    pub async fn claims(&self, token: &Token) -> Result<User> {
        let extraction = self.resolve(token).await?;

        for diagnostic in &extraction.diagnostics {
            tracing::warn!(
                provider = %self.config.name,
                attr = %diagnostic.field,
                mapping = %diagnostic.source,
                issue = %diagnostic.issue,
                "Failed to map attr"
            );
        }

        Ok(extraction.user)
    }

    async fn fetch_claims(&self, token: &Token) -> Result<RawClaims> {
        if self.config.driver.uses_id_token() {
            let id_token = token.id_token().ok_or(Error::MissingIdToken)?;
            let verifier = self.verifier.as_ref().ok_or_else(|| {
                Error::Config(format!("provider '{}' has no verifier", self.config.name))
            })?;
            return verifier.verify(id_token).await;
        }

        let url = self.config.profile_url().ok_or_else(|| {
            Error::Config(format!(
                "provider '{}' has no profile endpoint",
                self.config.name
            ))
        })?;
        self.client.profile(url, &token.access_token).await
    }

    async fn backfill_email(&self, token: &Token) -> Result<Option<String>> {
        let Some(url) = self.config.email_url() else {
            return Ok(None);
        };

        let records = self.client.emails(url, &token.access_token).await?;
        let email = primary_verified(&records).map(|record| record.email.clone());

        if email.is_none() {
            tracing::debug!(
                provider = %self.config.name,
                records = records.len(),
                "No primary verified email"
            );
        }

        Ok(email)
    }
}

/// Builder for [`Provider`] with injectable collaborators.
#[derive(Debug)]
pub struct ProviderBuilder {
    config: ProviderConfig,
    http_client: Option<reqwest::Client>,
    verifier: Option<Arc<dyn IdTokenVerifier>>,
}

impl ProviderBuilder {
    /// Use a custom HTTP client. Its timeout replaces the configured one.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Use a custom ID token verifier (OIDC only).
    pub fn with_verifier(mut self, verifier: Arc<dyn IdTokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn build(self) -> Result<Provider> {
        let config = self.config;

        if config.name.trim().is_empty() {
            return Err(Error::Config("provider name must not be empty".into()));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.request_timeout())
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?,
        };

        let verifier = if config.driver.uses_id_token() {
            match self.verifier {
                Some(verifier) => Some(verifier),
                None => Some(default_verifier(&config, http_client.clone())?),
            }
        } else {
            if config.profile_url().is_none() {
                return Err(Error::Config(format!(
                    "provider '{}': {} driver requires a profile endpoint",
                    config.name, config.driver
                )));
            }
            None
        };

        let mapper = mapper::for_driver(config.driver, &config.mappings);

        tracing::debug!(
            provider = %config.name,
            driver = %config.driver,
            "Provider initialized"
        );

        Ok(Provider {
            config: Arc::new(config),
            client: ProfileClient::new(http_client),
            verifier,
            mapper,
        })
    }
}

#[cfg(feature = "jwt-auth")]
fn default_verifier(
    config: &ProviderConfig,
    http_client: reqwest::Client,
) -> Result<Arc<dyn IdTokenVerifier>> {
    let verifier = crate::verifier::JwksVerifier::from_config(config, http_client)?;
    Ok(Arc::new(verifier))
}

#[cfg(not(feature = "jwt-auth"))]
fn default_verifier(
    config: &ProviderConfig,
    _http_client: reqwest::Client,
) -> Result<Arc<dyn IdTokenVerifier>> {
    Err(Error::Config(format!(
        "provider '{}': oidc driver needs a verifier or the 'jwt-auth' feature",
        config.name
    )))
}
