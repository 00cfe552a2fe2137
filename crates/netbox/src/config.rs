use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one NetBox instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetBoxConfig {
    /// Base URL without the `/api` suffix
    pub url: String,
    pub token: String,
    /// Site slug or numeric id used when a fetch names no facility
    pub site: Option<String>,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Default for NetBoxConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            site: None,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NetBoxConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.token.trim().is_empty()
    }

    /// `{url}/api/`, tolerant of trailing slashes in the configured URL
    pub fn api_base(&self) -> String {
        format!("{}/api/", self.url.trim().trim_end_matches('/'))
    }
}
