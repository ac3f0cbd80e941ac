//! GitHub REST `/user` mapper.

use crate::claims::RawClaims;
use crate::config::Driver;
use crate::user::{Extraction, Field, User};

use super::{ClaimsMapper, Extractor};

/// Maps a GitHub user.
///
/// GitHub sends `"email": null` for accounts with a private address, so a
/// `null` or absent email is not reported; the provider backfills it from
/// the email endpoint instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubMapper;

impl ClaimsMapper for GithubMapper {
    fn driver(&self) -> Driver {
        Driver::Github
    }

    fn extract_user(&self, raw: RawClaims) -> Extraction {
        let mut claims = Extractor::new(raw);

        let ident = claims.integer_id(Field::Ident, "id");
        let login = claims.text(Field::Login, "login");
        let name = claims.text(Field::Name, "name");
        let email = claims.nullable_text(Field::Email, "email");

        claims.finish(User {
            ident,
            login,
            name,
            email,
            ..User::default()
        })
    }
}
