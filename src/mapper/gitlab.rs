//! GitLab REST `/api/v4/user` mapper.

use crate::claims::RawClaims;
use crate::config::Driver;
use crate::user::{Extraction, Field, User};

use super::{ClaimsMapper, Extractor};

/// Maps a GitLab user. The numeric `id` becomes a decimal string.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitlabMapper;

impl ClaimsMapper for GitlabMapper {
    fn driver(&self) -> Driver {
        Driver::Gitlab
    }

    fn extract_user(&self, raw: RawClaims) -> Extraction {
        let mut claims = Extractor::new(raw);

        let ident = claims.integer_id(Field::Ident, "id");
        let login = claims.text(Field::Login, "username");
        let name = claims.text(Field::Name, "name");
        let email = claims.text(Field::Email, "email");

        claims.finish(User {
            ident,
            login,
            name,
            email,
            ..User::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Issue, ValueKind};
    use serde_json::json;

    #[test]
    fn test_rest_user() {
        let raw = RawClaims::try_from(json!({
            "id": 12345,
            "username": "jdoe",
            "name": "Jane Doe",
            "email": "jane@gitlab.example.com",
            "state": "active"
        }))
        .unwrap();

        let extraction = GitlabMapper.extract_user(raw);
        assert!(extraction.is_clean());
        assert_eq!(extraction.user.ident, "12345");
        assert_eq!(extraction.user.login, "jdoe");
    }

    #[test]
    fn test_string_id_is_a_mismatch() {
        let raw = RawClaims::try_from(json!({"id": "12345", "username": "jdoe"})).unwrap();

        let extraction = GitlabMapper.extract_user(raw);
        assert_eq!(extraction.user.ident, "");
        let diagnostic = extraction.diagnostics_for(Field::Ident).next().unwrap();
        assert_eq!(
            diagnostic.issue,
            Issue::TypeMismatch {
                observed: ValueKind::String
            }
        );
    }
}
