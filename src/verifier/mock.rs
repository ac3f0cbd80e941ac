//! Mock verifier for tests and local development. Never use in production.

use async_trait::async_trait;
use serde_json::Value;

use super::IdTokenVerifier;
use crate::claims::RawClaims;
use crate::error::{Error, Result};

/// Verifier that returns a fixed claim set without checking anything.
///
/// # Example
///
/// ```rust
/// use gexec_authn::verifier::{IdTokenVerifier, MockVerifier};
///
/// # async fn example() -> gexec_authn::Result<()> {
/// let verifier = MockVerifier::new()
///     .with_claim("sub", "248289761001")
///     .with_claim("groups", serde_json::json!(["admin"]));
///
/// let claims = verifier.verify("any-token").await?;
/// assert_eq!(claims.string("sub"), Ok("248289761001"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockVerifier {
    claims: RawClaims,
    /// Only this token is accepted when set.
    expected_token: Option<String>,
    /// Every call fails with this reason when set.
    rejection: Option<String>,
}

impl MockVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete claim set.
    pub fn with_claims(claims: RawClaims) -> Self {
        Self {
            claims,
            ..Self::default()
        }
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(key, value);
        self
    }

    /// Reject any token other than `token`.
    pub fn expect_token(mut self, token: impl Into<String>) -> Self {
        self.expected_token = Some(token.into());
        self
    }

    /// Reject every token with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl IdTokenVerifier for MockVerifier {
    async fn verify(&self, id_token: &str) -> Result<RawClaims> {
        if let Some(reason) = &self.rejection {
            return Err(Error::TokenVerificationFailed(reason.clone()));
        }

        if let Some(expected) = &self.expected_token {
            if expected != id_token {
                return Err(Error::TokenVerificationFailed(
                    "unexpected id_token".to_string(),
                ));
            }
        }

        Ok(self.claims.clone())
    }
}
