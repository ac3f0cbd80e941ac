//! OAuth2 token as handed over by the authorization-code exchange.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Token endpoint response.
///
/// Fields beyond the standard set land in `extra`; for OIDC providers that
/// is where the signed `id_token` lives.
///
/// # Example
///
/// ```rust
/// use gexec_authn::Token;
///
/// let token: Token = serde_json::from_str(
///     r#"{"access_token":"at","token_type":"Bearer","id_token":"eyJ..."}"#,
/// ).unwrap();
/// assert_eq!(token.access_token, "at");
/// assert_eq!(token.id_token(), Some("eyJ..."));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Access token.
    pub access_token: String,

    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Refresh token (if supported).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Additional response data.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Create a bearer token with no extras.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token: None,
            expires_in: None,
            extra: HashMap::new(),
        }
    }

    /// Attach an extra response value.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Attach an OIDC ID token.
    pub fn with_id_token(self, id_token: impl Into<String>) -> Self {
        self.with_extra("id_token", id_token.into())
    }

    /// Look up an extra response value.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// The `id_token` extra, when present and a string.
    pub fn id_token(&self) -> Option<&str> {
        self.extra("id_token").and_then(Value::as_str)
    }
}
