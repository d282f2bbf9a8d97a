mod env;
mod types;


pub use types::*;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail};
use url::Url;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults (and no rules) when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Check rule and limit settings before any document is fetched.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.reducer.budget == 0 {
            bail!("reducer.budget must be greater than zero");
        }
        if self.fetch.timeout == 0 {
            bail!("fetch.timeout must be greater than zero");
        }

        let mut names = HashSet::new();
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                bail!("rule name must not be empty");
            }
            if !names.insert(rule.name.as_str()) {
                bail!("duplicate rule name: {}", rule.name);
            }
            if rule.specs.is_empty() {
                bail!("rule {} has no specs", rule.name);
            }
            for spec in &rule.specs {
                validate_spec_path(&rule.name, &spec.path)?;
            }
        }
        Ok(())
    }

    /// Enabled rules, optionally narrowed to a single name.
    pub fn enabled_rules<'a>(
        &'a self,
        only: Option<&'a str>,
    ) -> impl Iterator<Item = &'a RuleConfig> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.enabled && only.is_none_or(|name| rule.name == name))
    }
}

fn validate_spec_path(rule: &str, path: &str) -> anyhow::Result<()> {
    if path.trim().is_empty() {
        bail!("rule {rule} has a spec with an empty path");
    }
    if path.contains("://") {
        let url = Url::parse(path)
            .with_context(|| format!("rule {rule} has an invalid spec URL: {path}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "rule {rule} has a spec URL with unsupported scheme {}: {path}",
                url.scheme()
            );
        }
    }
    Ok(())
}
