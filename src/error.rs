//! Error types for identity resolution.
//!
//! Only structural failures surface here. Field-level problems found while
//! mapping claims (a missing `roles` claim, an `email` of the wrong type) are
//! never errors; they are reported as [`Diagnostic`](crate::Diagnostic)s and
//! the affected field is left empty.

use thiserror::Error;

/// Errors that abort a [`Provider::claims`](crate::Provider::claims) call or
/// provider construction.
#[derive(Debug, Error)]
pub enum Error {
    /// The OIDC token response did not carry an `id_token` string.
    #[error("token is missing the id_token value")]
    MissingIdToken,

    /// The ID token failed signature, expiry, issuer or audience checks.
    #[error("failed to verify token: {0}")]
    TokenVerificationFailed(String),

    /// The verified ID token payload was not a JSON object.
    #[error("failed to parse claims: {0}")]
    ClaimsDecodeFailed(String),

    /// Transport failure while calling the profile endpoint.
    #[error("failed to fetch userinfo: {0}")]
    ProfileFetchFailed(#[source] reqwest::Error),

    /// The profile endpoint answered with a non-2xx status.
    #[error("bad status code returned: {status}")]
    ProfileBadStatus { status: u16 },

    /// The profile body was not a JSON object.
    #[error("failed to decode userinfo: {0}")]
    ProfileDecodeFailed(String),

    /// Transport failure or non-2xx status on the email endpoint.
    #[error("failed to fetch emails: {0}")]
    EmailFetchFailed(#[source] reqwest::Error),

    /// The email body was not an array of email records.
    #[error("failed to decode emails: {0}")]
    EmailDecodeFailed(String),

    /// The driver name is not one of the supported drivers.
    #[error("unknown driver '{0}', valid drivers: oidc, entraid, google, gitea, gitlab, github")]
    UnknownDriver(String),

    /// Invalid or inconsistent provider configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration or secret files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error stems from configuration rather than a login attempt.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnknownDriver(_) | Self::Io(_))
    }
}

/// Result type for identity resolution.
pub type Result<T> = std::result::Result<T, Error>;
