//! Named collection of configured providers.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::provider::Provider;

/// Providers keyed by name, in configuration order.
///
/// # Example
///
/// ```rust
/// use gexec_authn::{AuthConfig, ProviderRegistry};
///
/// let config = AuthConfig::from_toml_str(r#"
///     [[providers]]
///     name = "github"
///     driver = "github"
///
///     [[providers]]
///     name = "gitlab"
///     driver = "gitlab"
/// "#).unwrap();
///
/// let registry = ProviderRegistry::from_config(&config).unwrap();
/// assert_eq!(registry.names().collect::<Vec<_>>(), vec!["github", "gitlab"]);
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Arc<Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and build one provider per entry.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::new();
        for provider_config in &config.providers {
            registry.register(Provider::new(provider_config.clone())?)?;
        }

        tracing::info!(
            providers = registry.len(),
            names = ?registry.names().collect::<Vec<_>>(),
            "Provider registry ready"
        );

        Ok(registry)
    }

    /// Add a provider. Names must be unique.
    pub fn register(&mut self, provider: Provider) -> Result<()> {
        let name = provider.name().to_string();
        if self.providers.contains_key(&name) {
            return Err(Error::Config(format!(
                "duplicate provider name '{}'",
                name
            )));
        }
        self.providers.insert(name, Arc::new(provider));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Provider names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Driver, ProviderConfig};

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("github"));
        assert!(registry.get("github").is_none());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = ProviderRegistry::new();
        registry
            .register(Provider::new(ProviderConfig::new("github", Driver::Github)).unwrap())
            .unwrap();
        let err = registry
            .register(Provider::new(ProviderConfig::new("github", Driver::Github)).unwrap())
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_debug_lists_names_only() {
        let mut registry = ProviderRegistry::new();
        registry
            .register(
                Provider::new(
                    ProviderConfig::new("gitlab", Driver::Gitlab).with_client("id", "hunter2"),
                )
                .unwrap(),
            )
            .unwrap();

        let debug = format!("{:?}", registry);
        assert!(debug.contains("ProviderRegistry"));
        assert!(debug.contains("gitlab"));
        assert!(!debug.contains("hunter2"));
    }
}
