//! Multi-provider identity resolution for OAuth2 and OpenID Connect logins.
//!
//! After an authorization-code exchange the caller holds a [`Token`]. This
//! crate turns that token into a provider-agnostic [`User`]: it verifies the
//! OIDC ID token or calls the provider's profile endpoint, maps the
//! provider-specific claim names onto fixed fields, and for GitHub backfills
//! a private email address from the email list endpoint.
//!
//! # Overview
//!
//! Mapping is resilient. A missing or mistyped claim never fails a login;
//! the field stays empty and a [`Diagnostic`] is recorded. Only structural
//! failures such as an unreachable profile endpoint or an invalid ID token
//! surface as [`Error`].
//!
//! ```rust,no_run
//! use gexec_authn::{AuthConfig, ProviderRegistry, Token};
//! use std::path::Path;
//!
//! # async fn example() -> gexec_authn::Result<()> {
//! let config = AuthConfig::load(Path::new("/etc/gexec/auth.toml"))?;
//! let registry = ProviderRegistry::from_config(&config)?;
//!
//! if let Some(provider) = registry.get("github") {
//!     let user = provider.claims(&Token::bearer("gho_xxx")).await?;
//!     println!("{} ({})", user.login, user.ident);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`claims`] - Loosely-typed claim sets with safe typed reads
//! - [`mapper`] - One claims mapper per driver
//! - [`verifier`] - ID token verification
//! - [`fetch`] - Profile and email endpoint calls
//! - [`config`] - Provider configuration and secret references
//! - [`logging`] - Optional subscriber bootstrap (feature `logging`)
//!
//! # Features
//!
//! - `jwt-auth` (default): JWKS-backed [`verifier::JwksVerifier`]
//! - `logging` (default): [`logging::init`]

pub mod claims;
pub mod config;
pub mod error;
pub mod fetch;
pub mod mapper;
pub mod provider;
pub mod registry;
pub mod token;
pub mod user;
pub mod verifier;

#[cfg(feature = "logging")]
pub mod logging;

pub use claims::{Issue, Lookup, RawClaims, ValueKind};
pub use config::{resolve_secret, AuthConfig, Driver, Endpoints, Mappings, ProviderConfig};
pub use error::{Error, Result};
pub use fetch::EmailRecord;
pub use provider::{Provider, ProviderBuilder};
pub use registry::ProviderRegistry;
pub use token::Token;
pub use user::{Diagnostic, Extraction, Field, User};
pub use verifier::IdTokenVerifier;
