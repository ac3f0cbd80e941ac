//! ID token verification.
//!
//! The OIDC driver does not call a profile endpoint. Its claim set is the
//! payload of the `id_token` returned by the code exchange, which must be
//! verified first. [`IdTokenVerifier`] is the seam for that; the crate ships
//! [`JwksVerifier`] (feature `jwt-auth`) and [`MockVerifier`] for tests.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::claims::RawClaims;
use crate::error::Result;

#[cfg(feature = "jwt-auth")]
mod jwks;
mod mock;

#[cfg(feature = "jwt-auth")]
pub use jwks::JwksVerifier;
pub use mock::MockVerifier;

/// Verifies a compact-serialized ID token and returns its payload.
///
/// Implementations return [`Error::TokenVerificationFailed`] for signature,
/// expiry, issuer, audience or key problems and
/// [`Error::ClaimsDecodeFailed`] when the verified payload is not a JSON
/// object.
///
/// [`Error::TokenVerificationFailed`]: crate::Error::TokenVerificationFailed
/// [`Error::ClaimsDecodeFailed`]: crate::Error::ClaimsDecodeFailed
#[async_trait]
pub trait IdTokenVerifier: Send + Sync + Debug {
    async fn verify(&self, id_token: &str) -> Result<RawClaims>;
}
