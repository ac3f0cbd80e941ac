//! Per-driver mapping tables.
//!
//! Every driver is checked against a realistic claim set, an empty claim set
//! and a claim set where every mapped key holds the wrong type. Mapping must
//! never panic and must leave failed fields empty.

use rstest::rstest;
use serde_json::{json, Value};

use gexec_authn::mapper::{for_driver, ClaimsMapper};
use gexec_authn::{Driver, Field, Issue, Mappings, RawClaims, ValueKind};

fn claims(value: Value) -> RawClaims {
    RawClaims::try_from(value).unwrap()
}

fn mapper(driver: Driver) -> std::sync::Arc<dyn ClaimsMapper> {
    for_driver(driver, &Mappings::standard().with_role("groups"))
}

mod identity {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::oidc(
        Driver::Oidc,
        json!({
            "sub": "248289761001",
            "preferred_username": "jdoe",
            "name": "Jane Doe",
            "email": "jane@example.com",
            "groups": ["admin"]
        }),
        ["248289761001", "jdoe", "Jane Doe", "jane@example.com"]
    )]
    #[case::entraid(
        Driver::EntraId,
        json!({
            "id": "87d349ed-44d7-43e1-9a83-5f2406dee5bd",
            "displayName": "Adele Vance",
            "mail": "AdeleV@contoso.com"
        }),
        ["87d349ed-44d7-43e1-9a83-5f2406dee5bd", "adele-vance", "Adele Vance", "AdeleV@contoso.com"]
    )]
    #[case::google(
        Driver::Google,
        json!({"id": "1101694844", "name": "Jane Q. Doe", "email": "jane@gmail.com"}),
        ["1101694844", "jane-q-doe", "Jane Q. Doe", "jane@gmail.com"]
    )]
    #[case::gitea(
        Driver::Gitea,
        json!({"sub": "7", "preferred_username": "jdoe", "name": "Jane Doe", "email": "jane@gitea.io"}),
        ["7", "jdoe", "Jane Doe", "jane@gitea.io"]
    )]
    #[case::gitlab(
        Driver::Gitlab,
        json!({"id": 12345, "username": "jdoe", "name": "Jane Doe", "email": "jane@gitlab.com"}),
        ["12345", "jdoe", "Jane Doe", "jane@gitlab.com"]
    )]
    #[case::github(
        Driver::Github,
        json!({"id": 583231, "login": "octocat", "name": "The Octocat", "email": "octocat@github.com"}),
        ["583231", "octocat", "The Octocat", "octocat@github.com"]
    )]
    fn maps_fields(#[case] driver: Driver, #[case] input: Value, #[case] expected: [&str; 4]) {
        let raw = claims(input);
        let extraction = mapper(driver).extract_user(raw.clone());
        let user = &extraction.user;

        assert!(extraction.is_clean(), "{:?}", extraction.diagnostics);
        assert_eq!(
            [
                user.ident.as_str(),
                user.login.as_str(),
                user.name.as_str(),
                user.email.as_str()
            ],
            expected
        );
        assert_eq!(user.raw, raw);
    }

    #[rstest]
    #[case(Driver::EntraId)]
    #[case(Driver::Google)]
    #[case(Driver::Gitea)]
    #[case(Driver::Gitlab)]
    #[case(Driver::Github)]
    fn only_oidc_fills_roles(#[case] driver: Driver) {
        let raw = claims(json!({"groups": ["admin"], "roles": ["admin"]}));
        assert!(mapper(driver).extract_user(raw).user.roles.is_empty());
    }
}

mod resilience {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::oidc(Driver::Oidc, 5)]
    #[case::entraid(Driver::EntraId, 4)]
    #[case::google(Driver::Google, 4)]
    #[case::gitea(Driver::Gitea, 4)]
    #[case::gitlab(Driver::Gitlab, 4)]
    #[case::github(Driver::Github, 3)]
    fn empty_claims(#[case] driver: Driver, #[case] diagnostics: usize) {
        let extraction = mapper(driver).extract_user(RawClaims::new());
        let user = &extraction.user;

        assert_eq!(user.ident, "");
        assert_eq!(user.login, "");
        assert_eq!(user.name, "");
        assert_eq!(user.email, "");
        assert!(user.roles.is_empty());
        assert_eq!(extraction.diagnostics.len(), diagnostics);
        assert!(extraction
            .diagnostics
            .iter()
            .all(|d| d.issue == Issue::Missing));
    }

    #[rstest]
    #[case::oidc(Driver::Oidc)]
    #[case::entraid(Driver::EntraId)]
    #[case::google(Driver::Google)]
    #[case::gitea(Driver::Gitea)]
    #[case::gitlab(Driver::Gitlab)]
    #[case::github(Driver::Github)]
    fn wrong_types(#[case] driver: Driver) {
        let raw = claims(json!({
            "id": true,
            "sub": true,
            "login": true,
            "username": true,
            "preferred_username": true,
            "displayName": true,
            "name": true,
            "mail": true,
            "email": true,
            "groups": true
        }));

        let extraction = mapper(driver).extract_user(raw);
        let user = &extraction.user;

        assert_eq!(user.ident, "");
        assert_eq!(user.login, "");
        assert_eq!(user.name, "");
        assert_eq!(user.email, "");
        assert!(user.roles.is_empty());
        assert!(!extraction.is_clean());
        assert!(extraction.diagnostics.iter().all(|d| d.issue
            == Issue::TypeMismatch {
                observed: ValueKind::Boolean
            }));
    }

    #[test]
    fn github_null_email_is_silent() {
        let raw = claims(json!({"id": 1, "login": "octocat", "name": "Octo", "email": null}));
        let extraction = mapper(Driver::Github).extract_user(raw);
        assert!(extraction.is_clean());
        assert_eq!(extraction.user.email, "");
    }

    #[test]
    fn partial_failure_keeps_other_fields() {
        let raw = claims(json!({"id": 1, "login": "octocat", "name": 42}));
        let extraction = mapper(Driver::Github).extract_user(raw);

        assert_eq!(extraction.user.ident, "1");
        assert_eq!(extraction.user.login, "octocat");
        assert_eq!(extraction.user.name, "");
        assert_eq!(extraction.diagnostics.len(), 1);
        assert_eq!(extraction.diagnostics[0].field, Field::Name);
    }
}

mod numeric_ids {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::integer(json!(12345), "12345")]
    #[case::integral_float(json!(12345.0), "12345")]
    #[case::beyond_i64(json!(18446744073709551615u64), "18446744073709551615")]
    #[case::negative(json!(-1), "-1")]
    fn renders_exactly(#[case] id: Value, #[case] expected: &str) {
        for driver in [Driver::Gitlab, Driver::Github] {
            let extraction = mapper(driver).extract_user(claims(json!({"id": id.clone()})));
            assert_eq!(extraction.user.ident, expected);
            assert_eq!(extraction.diagnostics_for(Field::Ident).count(), 0);
        }
    }

    #[rstest]
    #[case::huge(json!(1e20))]
    #[case::fraction(json!(12.5))]
    fn out_of_range(#[case] id: Value) {
        let extraction = mapper(Driver::Gitlab).extract_user(claims(json!({"id": id})));
        assert_eq!(extraction.user.ident, "");

        let diagnostic = extraction.diagnostics_for(Field::Ident).next().unwrap();
        assert!(matches!(diagnostic.issue, Issue::OutOfRange { .. }));
        assert_eq!(diagnostic.source, "id");
    }
}

mod oidc_roles {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn array_of_strings() {
        let raw = claims(json!({"sub": "abc", "groups": ["admin", "dev"]}));
        let extraction = mapper(Driver::Oidc).extract_user(raw);
        assert_eq!(extraction.user.roles, vec!["admin", "dev"]);
    }

    #[test]
    fn bare_string_yields_empty_roles() {
        let raw = claims(json!({"sub": "abc", "groups": "admin"}));
        let extraction = mapper(Driver::Oidc).extract_user(raw);

        assert!(extraction.user.roles.is_empty());
        let diagnostic = extraction.diagnostics_for(Field::Roles).next().unwrap();
        assert_eq!(
            diagnostic.issue,
            Issue::TypeMismatch {
                observed: ValueKind::String
            }
        );
    }

    #[test]
    fn non_string_element_yields_empty_roles() {
        let raw = claims(json!({"sub": "abc", "groups": ["admin", {"id": 1}]}));
        let extraction = mapper(Driver::Oidc).extract_user(raw);

        assert!(extraction.user.roles.is_empty());
        let diagnostic = extraction.diagnostics_for(Field::Roles).next().unwrap();
        assert_eq!(
            diagnostic.issue,
            Issue::ElementMismatch {
                index: 1,
                observed: ValueKind::Object
            }
        );
    }

    #[test]
    fn custom_mapping_keys() {
        let mappings = Mappings {
            login: "upn".into(),
            name: "display".into(),
            email: "".into(),
            role: "realm_roles".into(),
        };
        let raw = claims(json!({
            "sub": "abc",
            "upn": "jdoe@corp",
            "display": "Jane",
            "email": "ignored@corp",
            "realm_roles": []
        }));

        let extraction = for_driver(Driver::Oidc, &mappings).extract_user(raw);
        assert!(extraction.is_clean());
        assert_eq!(extraction.user.login, "jdoe@corp");
        assert_eq!(extraction.user.name, "Jane");
        assert_eq!(extraction.user.email, "");
        assert!(extraction.user.roles.is_empty());
    }
}
