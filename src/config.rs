//! Provider configuration.
//!
//! Configuration is loaded once at startup and handed to
//! [`Provider`](crate::Provider) or [`ProviderRegistry`](crate::ProviderRegistry)
//! explicitly; nothing in this crate reads global state.
//!
//! # Example
//!
//! ```toml
//! [[providers]]
//! name = "github"
//! display = "GitHub"
//! driver = "github"
//! client_id = "Iv1.abc"
//! client_secret = "file:///run/secrets/github"
//! scopes = ["read:user", "user:email"]
//!
//! [[providers]]
//! name = "keycloak"
//! driver = "oidc"
//! client_id = "gexec"
//! issuer = "https://sso.example.com/realms/main"
//!
//! [providers.mappings]
//! login = "preferred_username"
//! name = "name"
//! email = "email"
//! role = "groups"
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Identity provider family. Selects the fetch path and the claims mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Driver {
    /// Any OpenID Connect provider, claims come from the verified ID token.
    Oidc,
    /// Microsoft Entra ID through Microsoft Graph.
    EntraId,
    /// Google OAuth2 userinfo.
    Google,
    /// Gitea OAuth2 userinfo.
    Gitea,
    /// GitLab REST API.
    Gitlab,
    /// GitHub REST API.
    Github,
}

impl Driver {
    /// All drivers in declaration order.
    pub const ALL: [Driver; 6] = [
        Driver::Oidc,
        Driver::EntraId,
        Driver::Google,
        Driver::Gitea,
        Driver::Gitlab,
        Driver::Github,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Oidc => "oidc",
            Driver::EntraId => "entraid",
            Driver::Google => "google",
            Driver::Gitea => "gitea",
            Driver::Gitlab => "gitlab",
            Driver::Github => "github",
        }
    }

    /// Whether claims come from a verified ID token instead of a profile call.
    pub fn uses_id_token(&self) -> bool {
        matches!(self, Driver::Oidc)
    }

    /// Public profile endpoint used when none is configured.
    pub fn default_profile_url(&self) -> Option<&'static str> {
        match self {
            Driver::EntraId => Some("https://graph.microsoft.com/v1.0/me"),
            Driver::Google => Some("https://www.googleapis.com/oauth2/v2/userinfo"),
            Driver::Gitlab => Some("https://gitlab.com/api/v4/user"),
            Driver::Github => Some("https://api.github.com/user"),
            Driver::Oidc | Driver::Gitea => None,
        }
    }

    /// Public email endpoint used when none is configured.
    pub fn default_email_url(&self) -> Option<&'static str> {
        match self {
            Driver::Github => Some("https://api.github.com/user/emails"),
            _ => None,
        }
    }
}

impl std::str::FromStr for Driver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "oidc" | "openid" => Ok(Driver::Oidc),
            "entraid" | "entra" => Ok(Driver::EntraId),
            "google" => Ok(Driver::Google),
            "gitea" => Ok(Driver::Gitea),
            "gitlab" => Ok(Driver::Gitlab),
            "github" => Ok(Driver::Github),
            _ => Err(Error::UnknownDriver(s.to_string())),
        }
    }
}

impl TryFrom<String> for Driver {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Driver> for String {
    fn from(driver: Driver) -> Self {
        driver.as_str().to_string()
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Authorization endpoint, consumed by the code exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Token endpoint, consumed by the code exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Profile (userinfo) endpoint for non-OIDC drivers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Email list endpoint, GitHub only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// JWKS endpoint for OIDC; discovered from the issuer when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks: Option<String>,
}

/// Claim keys feeding the user fields. Only the OIDC driver reads these.
///
/// An empty key disables the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl Mappings {
    /// The common OIDC standard claims, without roles.
    pub fn standard() -> Self {
        Self {
            login: "preferred_username".to_string(),
            name: "name".to_string(),
            email: "email".to_string(),
            role: String::new(),
        }
    }

    /// Set the roles claim.
    pub fn with_role(mut self, claim: impl Into<String>) -> Self {
        self.role = claim.into();
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Timeouts are written as seconds and may be fractional (`timeout = 0.5`).
mod timeout_secs {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(timeout: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if timeout.subsec_nanos() == 0 {
            serializer.serialize_u64(timeout.as_secs())
        } else {
            serializer.serialize_f64(timeout.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid timeout {}: {}", secs, e)))
    }
}

/// Configuration of a single identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique key of the provider.
    pub name: String,

    /// Label shown on the login page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Icon identifier shown on the login page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Provider family.
    pub driver: Driver,

    /// OAuth2 client ID; the expected ID token audience for OIDC.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret. Accepts `file://` and `base64://` references.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_secret: String,

    /// Requested scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// OIDC issuer URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub mappings: Mappings,

    /// Per-request HTTP timeout, written in seconds.
    #[serde(default = "default_timeout", with = "timeout_secs")]
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a configuration with defaults for everything but name and driver.
    pub fn new(name: impl Into<String>, driver: Driver) -> Self {
        Self {
            name: name.into(),
            display: None,
            icon: None,
            driver,
            client_id: String::new(),
            client_secret: String::new(),
            scopes: Vec::new(),
            issuer: None,
            endpoints: Endpoints::default(),
            mappings: Mappings::default(),
            timeout: default_timeout(),
        }
    }

    /// Set client credentials.
    pub fn with_client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = id.into();
        self.client_secret = secret.into();
        self
    }

    /// Set the OIDC issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.profile = Some(url.into());
        self
    }

    pub fn with_email_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.email = Some(url.into());
        self
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.jwks = Some(url.into());
        self
    }

    /// Set the OIDC claim mappings.
    pub fn with_mappings(mut self, mappings: Mappings) -> Self {
        self.mappings = mappings;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Label shown on the login page, falling back to the name.
    pub fn display_name(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.name)
    }

    /// Configured profile URL or the driver default.
    pub fn profile_url(&self) -> Option<&str> {
        self.endpoints
            .profile
            .as_deref()
            .or_else(|| self.driver.default_profile_url())
    }

    /// Configured email URL or the driver default.
    pub fn email_url(&self) -> Option<&str> {
        self.endpoints
            .email
            .as_deref()
            .or_else(|| self.driver.default_email_url())
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace a `file://` or `base64://` client secret with its value.
    pub fn resolve_secrets(&mut self) -> Result<()> {
        if !self.client_secret.is_empty() {
            self.client_secret = resolve_secret(&self.client_secret)?;
        }
        Ok(())
    }

    /// Check that the configuration can back a working provider.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("provider name must not be empty".into()));
        }

        let endpoints = [
            ("auth", self.endpoints.auth.as_deref()),
            ("token", self.endpoints.token.as_deref()),
            ("profile", self.endpoints.profile.as_deref()),
            ("email", self.endpoints.email.as_deref()),
            ("jwks", self.endpoints.jwks.as_deref()),
            ("issuer", self.issuer.as_deref()),
        ];
        for (field, value) in endpoints {
            if let Some(value) = value {
                url::Url::parse(value).map_err(|e| {
                    Error::Config(format!(
                        "provider '{}': invalid {} url '{}': {}",
                        self.name, field, value, e
                    ))
                })?;
            }
        }

        if self.timeout.is_zero() {
            return Err(Error::Config(format!(
                "provider '{}': timeout must be greater than zero",
                self.name
            )));
        }

        if self.driver.uses_id_token() {
            if self.issuer.is_none() && self.endpoints.jwks.is_none() {
                return Err(Error::Config(format!(
                    "provider '{}': oidc driver requires an issuer or a jwks endpoint",
                    self.name
                )));
            }
            // The client ID is the expected audience of every ID token.
            if self.client_id.trim().is_empty() {
                return Err(Error::Config(format!(
                    "provider '{}': oidc driver requires a client_id",
                    self.name
                )));
            }
        } else if self.profile_url().is_none() {
            return Err(Error::Config(format!(
                "provider '{}': {} driver requires a profile endpoint",
                self.name, self.driver
            )));
        }

        Ok(())
    }
}

/// The full authentication configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Providers in login page order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl AuthConfig {
    /// Load, resolve secrets and validate a configuration file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML. A
    /// missing file yields an empty configuration, which disables external
    /// login.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Auth config not found, no providers loaded");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        config.resolve_secrets()?;
        config.validate()?;

        tracing::info!(
            path = %path.display(),
            providers = config.providers.len(),
            "Loaded auth config"
        );

        Ok(config)
    }

    /// Parse TOML content without resolving secrets.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Parse JSON content without resolving secrets.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Resolve secret references of every provider.
    pub fn resolve_secrets(&mut self) -> Result<()> {
        self.providers
            .iter_mut()
            .try_for_each(ProviderConfig::resolve_secrets)
    }

    /// Validate every provider and reject duplicate names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider.validate()?;
            if !seen.insert(provider.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate provider name '{}'",
                    provider.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a provider configuration by name.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// Resolve a configuration value that may reference a secret.
///
/// - `file://<path>` reads the file, dropping one trailing newline
/// - `base64://<data>` decodes standard base64 into UTF-8
/// - anything else is returned unchanged
pub fn resolve_secret(value: &str) -> Result<String> {
    if let Some(path) = value.strip_prefix("file://") {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read secret file '{}': {}", path, e))
        })?;
        let trimmed = content
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(&content);
        return Ok(trimmed.to_string());
    }

    if let Some(data) = value.strip_prefix("base64://") {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| Error::Config(format!("Failed to parse base64 value: {}", e)))?;
        return String::from_utf8(bytes)
            .map_err(|e| Error::Config(format!("Base64 value is not UTF-8: {}", e)));
    }

    Ok(value.to_string())
}
