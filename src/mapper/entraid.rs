//! Microsoft Entra ID mapper for the Graph `/me` resource.

use crate::claims::RawClaims;
use crate::config::Driver;
use crate::user::{Extraction, Field, User};

use super::{slugify, ClaimsMapper, Extractor};

/// Maps a Microsoft Graph user.
///
/// Graph has no username, the login is the slugified `displayName`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntraIdMapper;

impl ClaimsMapper for EntraIdMapper {
    fn driver(&self) -> Driver {
        Driver::EntraId
    }

    fn extract_user(&self, raw: RawClaims) -> Extraction {
        let mut claims = Extractor::new(raw);

        let ident = claims.text(Field::Ident, "id");
        let login = slugify(&claims.text(Field::Login, "displayName"));
        let name = claims.text(Field::Name, "displayName");
        let email = claims.text(Field::Email, "mail");

        claims.finish(User {
            ident,
            login,
            name,
            email,
            ..User::default()
        })
    }
}
