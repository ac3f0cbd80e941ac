//! Claims mappers, one per identity provider family.
//!
//! A mapper turns a [`RawClaims`] set into a [`User`] and never fails: a
//! missing or mistyped claim leaves its field empty and adds a
//! [`Diagnostic`] to the [`Extraction`]. Mappers do no I/O and no logging,
//! the [`Provider`](crate::Provider) decides what to do with diagnostics.
//!
//! # Built-in Mappers
//!
//! | Driver    | Mapper            | Ident                 | Login                          |
//! |-----------|-------------------|-----------------------|--------------------------------|
//! | `oidc`    | [`OidcMapper`]    | `sub`                 | configured                     |
//! | `entraid` | [`EntraIdMapper`] | `id`                  | `displayName`, slugified       |
//! | `google`  | [`GoogleMapper`]  | `id`                  | `name`, slugified              |
//! | `gitea`   | [`GiteaMapper`]   | `sub`                 | `preferred_username`           |
//! | `gitlab`  | [`GitlabMapper`]  | `id`, number          | `username`                     |
//! | `github`  | [`GithubMapper`]  | `id`, number          | `login`                        |

use std::fmt::Debug;
use std::sync::Arc;

use crate::claims::{Issue, RawClaims};
use crate::config::{Driver, Mappings};
use crate::user::{Diagnostic, Extraction, Field, User};

mod entraid;
mod gitea;
mod github;
mod gitlab;
mod google;
mod oidc;

pub use entraid::EntraIdMapper;
pub use gitea::GiteaMapper;
pub use github::GithubMapper;
pub use gitlab::GitlabMapper;
pub use google::GoogleMapper;
pub use oidc::OidcMapper;

/// Strategy that maps a provider claim set onto a [`User`].
pub trait ClaimsMapper: Send + Sync + Debug {
    /// The driver this mapper serves.
    fn driver(&self) -> Driver;

    /// Map the claims. The claim set ends up in [`User::raw`].
    fn extract_user(&self, raw: RawClaims) -> Extraction;
}

/// Resolve the mapper for a driver.
///
/// `mappings` is only consulted by the OIDC driver.
pub fn for_driver(driver: Driver, mappings: &Mappings) -> Arc<dyn ClaimsMapper> {
    match driver {
        Driver::Oidc => Arc::new(OidcMapper::new(mappings.clone())),
        Driver::EntraId => Arc::new(EntraIdMapper),
        Driver::Google => Arc::new(GoogleMapper),
        Driver::Gitea => Arc::new(GiteaMapper),
        Driver::Gitlab => Arc::new(GitlabMapper),
        Driver::Github => Arc::new(GithubMapper),
    }
}

/// Collects typed reads from a claim set and the diagnostics they produce.
///
/// Every read returns the zero value on failure so mappers can assign
/// unconditionally.
#[derive(Debug)]
pub(crate) struct Extractor {
    raw: RawClaims,
    diagnostics: Vec<Diagnostic>,
}

impl Extractor {
    pub(crate) fn new(raw: RawClaims) -> Self {
        Self {
            raw,
            diagnostics: Vec::new(),
        }
    }

    fn record(&mut self, field: Field, source: &str, issue: Issue) {
        self.diagnostics.push(Diagnostic::new(field, source, issue));
    }

    fn settle<T: Default>(&mut self, field: Field, source: &str, lookup: Result<T, Issue>) -> T {
        lookup.unwrap_or_else(|issue| {
            self.record(field, source, issue);
            T::default()
        })
    }

    /// A string claim.
    pub(crate) fn text(&mut self, field: Field, key: &str) -> String {
        let lookup = self.raw.string(key).map(String::from);
        self.settle(field, key, lookup)
    }

    /// A string claim where `null` and absence are both silent.
    pub(crate) fn nullable_text(&mut self, field: Field, key: &str) -> String {
        let lookup = self
            .raw
            .nullable_string(key)
            .map(|value| value.map(String::from).unwrap_or_default());
        self.settle(field, key, lookup)
    }

    /// A numeric identifier rendered as a decimal string.
    pub(crate) fn integer_id(&mut self, field: Field, key: &str) -> String {
        let lookup = self.raw.integer_id(key);
        self.settle(field, key, lookup)
    }

    /// An array of strings.
    pub(crate) fn string_list(&mut self, field: Field, key: &str) -> Vec<String> {
        let lookup = self.raw.string_list(key);
        self.settle(field, key, lookup)
    }

    /// Attach the claim set to the user and hand back the result.
    pub(crate) fn finish(self, user: User) -> Extraction {
        Extraction {
            user: User {
                raw: self.raw,
                ..user
            },
            diagnostics: self.diagnostics,
        }
    }
}

/// Convert a display name into a login slug.
///
/// Transliterates to ASCII, lowercases, turns every run of other characters
/// into a single `-` and strips leading and trailing dashes.
///
/// ```rust
/// use gexec_authn::mapper::slugify;
///
/// assert_eq!(slugify("Jane Q. Doe"), "jane-q-doe");
/// assert_eq!(slugify("  --Admin__User--  "), "admin-user");
/// assert_eq!(slugify("José García"), "jose-garcia");
/// ```
pub fn slugify(s: &str) -> String {
    slug::slugify(s)
}
