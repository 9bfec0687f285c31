//! Immutable connection profile built once from `[backend]` config.

use std::fmt;
use std::time::Duration;

use ob_domain::config::BackendConfig;

/// How to reach and authenticate against the backend.
///
/// Constructed once at process start and shared read-only; nothing in the
/// bridge mutates it afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub database: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl ConnectionProfile {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            database: None,
            api_key: None,
            username: None,
            password: None,
            timeout,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    /// Full URL for an endpoint token, e.g. `search` → `{base}/mcp/search`.
    pub fn endpoint_url(&self, token: &str) -> String {
        format!("{}/mcp/{token}", self.base_url)
    }
}

impl From<&BackendConfig> for ConnectionProfile {
    fn from(cfg: &BackendConfig) -> Self {
        let mut profile = ConnectionProfile::new(&cfg.url, Duration::from_secs(cfg.timeout_secs));
        profile.database = cfg.db.clone();
        profile.api_key = cfg.api_key.clone();
        profile.username = cfg.user.clone();
        profile.password = cfg.password.clone();
        profile
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(v: &Option<String>) -> Option<&'static str> {
            v.as_ref().map(|_| "***")
        }
        f.debug_struct("ConnectionProfile")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("api_key", &mask(&self.api_key))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let p = ConnectionProfile::new("https://erp.example.com//", Duration::from_secs(5));
        assert_eq!(p.base_url, "https://erp.example.com");
        assert_eq!(p.endpoint_url("fields"), "https://erp.example.com/mcp/fields");
    }

    #[test]
    fn built_from_backend_config() {
        let cfg = BackendConfig {
            url: "http://odoo:8069/".into(),
            db: Some("prod".into()),
            user: Some("admin".into()),
            password: Some("pw".into()),
            timeout_secs: 12,
            ..BackendConfig::default()
        };
        let p = ConnectionProfile::from(&cfg);
        assert_eq!(p.base_url, "http://odoo:8069");
        assert_eq!(p.database.as_deref(), Some("prod"));
        assert_eq!(p.username.as_deref(), Some("admin"));
        assert_eq!(p.timeout, Duration::from_secs(12));
    }

    #[test]
    fn debug_masks_secrets() {
        let p = ConnectionProfile::new("http://x", Duration::from_secs(1))
            .with_api_key("secret-key")
            .with_credentials("admin", "pw123");
        let s = format!("{p:?}");
        assert!(!s.contains("secret-key"));
        assert!(!s.contains("pw123"));
        assert!(s.contains("admin"));
    }
}
