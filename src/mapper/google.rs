//! Google OAuth2 userinfo mapper.

use crate::claims::RawClaims;
use crate::config::Driver;
use crate::user::{Extraction, Field, User};

use super::{slugify, ClaimsMapper, Extractor};

/// Maps the `oauth2/v2/userinfo` document. The login is the slugified name.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleMapper;

impl ClaimsMapper for GoogleMapper {
    fn driver(&self) -> Driver {
        Driver::Google
    }

    fn extract_user(&self, raw: RawClaims) -> Extraction {
        let mut claims = Extractor::new(raw);

        let ident = claims.text(Field::Ident, "id");
        let login = slugify(&claims.text(Field::Login, "name"));
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
