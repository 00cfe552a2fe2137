use anyhow::{Context as AnyhowContext, Result};
use rackguard_netbox::{NetBoxConfig, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "rackguard.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub netbox: NetBoxSection,
    pub validation: ValidationSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetBoxSection {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Site slug or numeric id
    pub site: Option<String>,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
}

impl Default for NetBoxSection {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            site: None,
            verify_ssl: true,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationSection {
    pub naming_pattern: Option<String>,
    pub default_facility: Option<String>,
}

impl AppConfig {
    /// Read `path`, or `rackguard.toml` in the working directory when no path
    /// is given. Only an explicit path is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            log::debug!("No {} in working directory; using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&raw).with_context(|| format!("Invalid {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `NETBOX_URL`, `NETBOX_TOKEN` and `NETBOX_SITE` over file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup("NETBOX_URL") {
            self.netbox.url = Some(url);
        }
        if let Some(token) = lookup("NETBOX_TOKEN") {
            self.netbox.token = Some(token);
        }
        if let Some(site) = lookup("NETBOX_SITE") {
            self.netbox.site = Some(site);
        }
    }

    pub fn netbox_config(&self) -> NetBoxConfig {
        let section = &self.netbox;
        let mut config = NetBoxConfig::new(
            section.url.clone().unwrap_or_default(),
            section.token.clone().unwrap_or_default(),
        )
        .verify_tls(section.verify_ssl)
        .timeout(Duration::from_secs(section.timeout_secs.max(1)));
        if let Some(site) = &section.site {
            config = config.site(site.clone());
        }
        config
    }
}
