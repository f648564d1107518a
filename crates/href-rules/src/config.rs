// File: src/config.rs
// Purpose: Rule definitions and base location loaded from TOML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::{Location, Rule};

/// Router configuration
///
/// ```toml
/// [location]
/// href = "http://localhost/"
///
/// [rules.account]
/// path = "/:accType(checking|saving|credit)/:accId"
///
/// [rules.account.search]
/// from = ":fromDate?"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterConfig {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

/// Base location relative URLs resolve against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_href")]
    pub href: String,
}

/// One rule; conditions are code-only and cannot be configured
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuleConfig {
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub search: BTreeMap<String, String>,
}

fn default_href() -> String {
    "http://localhost/".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            href: default_href(),
        }
    }
}

impl From<&RuleConfig> for Rule {
    fn from(config: &RuleConfig) -> Self {
        Rule {
            path: config.path.clone(),
            search: config.search.clone(),
            condition: None,
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: RouterConfig =
            toml::from_str(content).context("Failed to parse router config")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the location and compiles every rule
    pub fn validate(&self) -> Result<()> {
        self.location()?;
        for (name, rule) in &self.rules {
            Rule::from(rule)
                .compile()
                .with_context(|| format!("Invalid rule '{}'", name))?;
        }
        Ok(())
    }

    pub fn location(&self) -> Result<Location> {
        Location::parse(&self.location.href)
            .with_context(|| format!("Invalid location href '{}'", self.location.href))
    }

    /// Gets a configured rule by name
    pub fn rule(&self, name: &str) -> Option<Rule> {
        self.rules.get(name).map(Rule::from)
    }

    /// All configured rules, ordered by name
    pub fn rules(&self) -> impl Iterator<Item = (&str, Rule)> + '_ {
        self.rules
            .iter()
            .map(|(name, config)| (name.as_str(), Rule::from(config)))
    }
}
