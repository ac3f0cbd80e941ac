//! The canonical user record and mapping diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::claims::{Issue, RawClaims};

/// Provider-agnostic identity produced by every driver.
///
/// Every field except `raw` may legitimately be empty: an identity provider
/// that does not publish a claim is not an error. Uniqueness of `ident`
/// across logins is the store layer's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Opaque external identifier.
    pub ident: String,

    /// Username or slug.
    pub login: String,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Role names in provider order. Only the generic OIDC driver fills this.
    #[serde(default)]
    pub roles: Vec<String>,

    /// The claim set the user was mapped from, kept for audit.
    #[serde(default)]
    pub raw: RawClaims,
}

impl User {
    /// Start an empty user around a claim set.
    pub fn from_raw(raw: RawClaims) -> Self {
        Self {
            raw,
            ..Self::default()
        }
    }
}

/// The `User` field a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Ident,
    Login,
    Name,
    Email,
    Roles,
}

impl Field {
    /// Lowercase field name as used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ident => "ident",
            Self::Login => "login",
            Self::Name => "name",
            Self::Email => "email",
            Self::Roles => "roles",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recovered field-level mapping failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The target field left empty.
    pub field: Field,

    /// The claim key it was read from.
    pub source: String,

    /// What went wrong.
    pub issue: Issue,
}

impl Diagnostic {
    pub fn new(field: Field, source: impl Into<String>, issue: Issue) -> Self {
        Self {
            field,
            source: source.into(),
            issue,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (claim '{}'): {}", self.field, self.source, self.issue)
    }
}

/// Result of mapping a claim set: the user plus every recovered failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub user: User,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// Whether every field mapped cleanly.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics for one field.
    pub fn diagnostics_for(&self, field: Field) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.field == field)
    }
}
