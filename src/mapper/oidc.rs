//! Generic OpenID Connect mapper driven by configured claim keys.

use crate::claims::RawClaims;
use crate::config::{Driver, Mappings};
use crate::user::{Extraction, Field, User};

use super::{ClaimsMapper, Extractor};

/// Maps ID token claims using [`Mappings`].
///
/// `ident` always comes from `sub`. Login, name, email and roles come from
/// the configured keys; a field whose key is empty is skipped without a
/// diagnostic.
///
/// # Example
///
/// ```rust
/// use gexec_authn::mapper::{ClaimsMapper, OidcMapper};
/// use gexec_authn::{Mappings, RawClaims};
/// use serde_json::json;
///
/// let mapper = OidcMapper::new(Mappings::standard().with_role("groups"));
/// let raw = RawClaims::try_from(json!({
///     "sub": "0b1c",
///     "preferred_username": "jdoe",
///     "groups": ["admin", "dev"],
/// }))
/// .unwrap();
///
/// let extraction = mapper.extract_user(raw);
/// assert_eq!(extraction.user.login, "jdoe");
/// assert_eq!(extraction.user.roles, vec!["admin", "dev"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OidcMapper {
    mappings: Mappings,
}

impl OidcMapper {
    pub fn new(mappings: Mappings) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &Mappings {
        &self.mappings
    }
}

impl ClaimsMapper for OidcMapper {
    fn driver(&self) -> Driver {
        Driver::Oidc
    }

    fn extract_user(&self, raw: RawClaims) -> Extraction {
        let mut claims = Extractor::new(raw);
        let mappings = &self.mappings;

        let ident = claims.text(Field::Ident, "sub");

        let login = if mappings.login.is_empty() {
            String::new()
        } else {
            claims.text(Field::Login, &mappings.login)
        };

        let name = if mappings.name.is_empty() {
            String::new()
        } else {
            claims.text(Field::Name, &mappings.name)
        };

        let email = if mappings.email.is_empty() {
            String::new()
        } else {
            claims.text(Field::Email, &mappings.email)
        };

        let roles = if mappings.role.is_empty() {
            Vec::new()
        } else {
            claims.string_list(Field::Roles, &mappings.role)
        };

        claims.finish(User {
            ident,
            login,
            name,
            email,
            roles,
            ..User::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Issue, ValueKind};
    use crate::user::Diagnostic;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mapper() -> OidcMapper {
        OidcMapper::new(Mappings {
            login: "preferred_username".into(),
            name: "name".into(),
            email: "email".into(),
            role: "groups".into(),
        })
    }

    #[test]
    fn test_full_claim_set() {
        let raw = RawClaims::try_from(json!({
            "sub": "248289761001",
            "preferred_username": "jdoe",
            "name": "Jane Doe",
            "email": "jane@example.com",
            "groups": ["admin", "dev"]
        }))
        .unwrap();

        let extraction = mapper().extract_user(raw.clone());
        assert!(extraction.is_clean());
        assert_eq!(
            extraction.user,
            User {
                ident: "248289761001".into(),
                login: "jdoe".into(),
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                roles: vec!["admin".into(), "dev".into()],
                raw,
            }
        );
    }

    #[test]
    fn test_roles_bare_string_is_recovered() {
        let raw = RawClaims::try_from(json!({
            "sub": "abc",
            "preferred_username": "jdoe",
            "name": "Jane Doe",
            "email": "jane@example.com",
            "groups": "admin"
        }))
        .unwrap();

        let extraction = mapper().extract_user(raw);
        assert!(extraction.user.roles.is_empty());
        assert_eq!(extraction.user.login, "jdoe");
        assert_eq!(
            extraction.diagnostics,
            vec![Diagnostic::new(
                Field::Roles,
                "groups",
                Issue::TypeMismatch {
                    observed: ValueKind::String
                }
            )]
        );
    }

    #[test]
    fn test_empty_mappings_are_skipped_silently() {
        let raw = RawClaims::try_from(json!({"sub": "abc"})).unwrap();
        let extraction = OidcMapper::default().extract_user(raw);

        assert!(extraction.is_clean());
        assert_eq!(extraction.user.ident, "abc");
        assert_eq!(extraction.user.login, "");
        assert!(extraction.user.roles.is_empty());
    }

    #[test]
    fn test_missing_sub_and_mapped_claims() {
        let raw = RawClaims::new();
        let extraction = mapper().extract_user(raw);

        let fields: Vec<Field> = extraction.diagnostics.iter().map(|d| d.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::Ident,
                Field::Login,
                Field::Name,
                Field::Email,
                Field::Roles
            ]
        );
        assert!(extraction
            .diagnostics
            .iter()
            .all(|d| d.issue == Issue::Missing));
    }
}
