//! Configuration loading and registry construction.

use std::io::Write;

use gexec_authn::{AuthConfig, Driver, Error, ProviderRegistry};

const CONFIG: &str = r#"
[[providers]]
name = "github"
display = "GitHub"
icon = "github"
driver = "github"
client_id = "Iv1.abc"
client_secret = "base64://c2VjcmV0"
scopes = ["read:user", "user:email"]

[[providers]]
name = "corp"
display = "Corporate SSO"
driver = "entraid"
client_id = "00000000-0000-0000-0000-000000000000"

[[providers]]
name = "keycloak"
driver = "openid"
client_id = "gexec"
issuer = "https://sso.example.com/realms/main"

[providers.mappings]
login = "preferred_username"
name = "name"
email = "email"
role = "groups"
"#;

fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

mod loading {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_toml_resolves_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "auth.toml", CONFIG);

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.providers.len(), 3);

        let github = config.provider("github").unwrap();
        assert_eq!(github.client_secret, "secret");
        assert_eq!(github.scopes, vec!["read:user", "user:email"]);
        assert_eq!(github.icon.as_deref(), Some("github"));

        let corp = config.provider("corp").unwrap();
        assert_eq!(corp.profile_url(), Some("https://graph.microsoft.com/v1.0/me"));

        let keycloak = config.provider("keycloak").unwrap();
        assert_eq!(keycloak.driver, Driver::Oidc);
        assert_eq!(keycloak.mappings.role, "groups");
    }

    #[test]
    fn test_load_secret_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let secret = write_config(&dir, "secret", "from-file\n");
        let content = format!(
            "[[providers]]\nname = \"gitlab\"\ndriver = \"gitlab\"\nclient_secret = \"file://{}\"\n",
            secret.display()
        );
        let path = write_config(&dir, "auth.toml", &content);

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.providers[0].client_secret, "from-file");
    }

    #[test]
    fn test_load_rejects_missing_secret_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "auth.toml",
            "[[providers]]\nname = \"gitlab\"\ndriver = \"gitlab\"\nclient_secret = \"file:///nonexistent/secret\"\n",
        );
        assert!(matches!(AuthConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_rejects_oidc_without_issuer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "auth.json",
            r#"{"providers": [{"name": "sso", "driver": "oidc", "client_id": "gexec"}]}"#,
        );
        let err = AuthConfig::load(&path).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn test_load_rejects_oidc_without_client_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "auth.toml",
            "[[providers]]\nname = \"sso\"\ndriver = \"oidc\"\nissuer = \"https://sso.example.com\"\n",
        );
        let err = AuthConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("client_id"), "{err}");
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "auth.toml",
            "[[providers]]\nname = \"github\"\ndriver = \"github\"\ntimeout = 0\n",
        );
        let err = AuthConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("timeout"), "{err}");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuthConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.providers.is_empty());
    }
}

mod registry {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preserves_config_order() {
        let config = AuthConfig::from_toml_str(CONFIG).unwrap();
        let registry = ProviderRegistry::from_config(&config).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["github", "corp", "keycloak"]
        );
        assert_eq!(
            registry.iter().map(|p| p.driver()).collect::<Vec<_>>(),
            vec![Driver::Github, Driver::EntraId, Driver::Oidc]
        );
    }

    #[test]
    fn test_get_shares_provider() {
        let config = AuthConfig::from_toml_str(CONFIG).unwrap();
        let registry = ProviderRegistry::from_config(&config).unwrap();

        let first = registry.get("corp").unwrap();
        let second = registry.get("corp").unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(first.config().display_name(), "Corporate SSO");
        assert!(registry.get("bitbucket").is_none());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let config = AuthConfig::from_toml_str(
            r#"
            [[providers]]
            name = "git"
            driver = "github"

            [[providers]]
            name = "git"
            driver = "gitlab"
            "#,
        )
        .unwrap();

        let err = ProviderRegistry::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate provider name 'git'"));
    }

    #[test]
    fn test_empty_config() {
        let registry = ProviderRegistry::from_config(&AuthConfig::default()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(format!("{:?}", registry), "ProviderRegistry { providers: [] }");
    }
}
