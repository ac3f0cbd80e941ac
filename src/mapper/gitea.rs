//! Gitea OAuth2 userinfo mapper.

use crate::claims::RawClaims;
use crate::config::Driver;
use crate::user::{Extraction, Field, User};

use super::{ClaimsMapper, Extractor};

/// Maps the `/login/oauth/userinfo` document, which follows OIDC naming.
#[derive(Debug, Clone, Copy, Default)]
pub struct GiteaMapper;

impl ClaimsMapper for GiteaMapper {
    fn driver(&self) -> Driver {
        Driver::Gitea
    }

    fn extract_user(&self, raw: RawClaims) -> Extraction {
        let mut claims = Extractor::new(raw);

        let ident = claims.text(Field::Ident, "sub");
        let login = claims.text(Field::Login, "preferred_username");
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
