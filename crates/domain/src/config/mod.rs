mod backend;
mod observability;
mod server;

pub use backend::*;
pub use observability::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Environment overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl Config {
    /// Overlay environment variables on top of the file values.
    ///
    /// | Variable           | Field                  |
    /// |--------------------|------------------------|
    /// | `ODOO_URL`         | `backend.url`          |
    /// | `ODOO_DB`          | `backend.db`           |
    /// | `ODOO_API_KEY`     | `backend.api_key`      |
    /// | `ODOO_USER`        | `backend.user`         |
    /// | `ODOO_PASSWORD`    | `backend.password`     |
    /// | `ODOO_MAX_RECORDS` | `backend.max_records`  |
    /// | `ODOO_TIMEOUT`     | `backend.timeout_secs` |
    /// | `MCP_TRANSPORT`    | `server.transport`     |
    /// | `MCP_HOST`         | `server.host`          |
    /// | `MCP_PORT`         | `server.port`          |
    ///
    /// `lookup` abstracts `std::env::var` so tests stay hermetic.  Values
    /// that fail to parse are reported and leave the field untouched.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut issues = Vec::new();

        if let Some(v) = lookup("ODOO_URL") {
            self.backend.url = v;
        }
        if let Some(v) = lookup("ODOO_DB") {
            self.backend.db = Some(v);
        }
        if let Some(v) = lookup("ODOO_API_KEY") {
            self.backend.api_key = Some(v);
        }
        if let Some(v) = lookup("ODOO_USER") {
            self.backend.user = Some(v);
        }
        if let Some(v) = lookup("ODOO_PASSWORD") {
            self.backend.password = Some(v);
        }
        if let Some(v) = lookup("ODOO_MAX_RECORDS") {
            match v.trim().parse() {
                Ok(n) => self.backend.max_records = n,
                Err(_) => issues.push(ConfigError::env("ODOO_MAX_RECORDS", &v)),
            }
        }
        if let Some(v) = lookup("ODOO_TIMEOUT") {
            match v.trim().parse() {
                Ok(n) => self.backend.timeout_secs = n,
                Err(_) => issues.push(ConfigError::env("ODOO_TIMEOUT", &v)),
            }
        }
        if let Some(v) = lookup("MCP_TRANSPORT") {
            match v.parse() {
                Ok(t) => self.server.transport = t,
                Err(_) => issues.push(ConfigError::env("MCP_TRANSPORT", &v)),
            }
        }
        if let Some(v) = lookup("MCP_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("MCP_PORT") {
            match v.trim().parse() {
                Ok(n) => self.server.port = n,
                Err(_) => issues.push(ConfigError::env("MCP_PORT", &v)),
            }
        }

        issues
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    fn env(var: &str, raw: &str) -> Self {
        Self::warning(var, format!("ignoring unparseable value \"{raw}\""))
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let url = self.backend.url.trim();
        if url.is_empty() {
            errors.push(ConfigError::error("backend.url", "url must not be empty"));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::error(
                "backend.url",
                "url must start with http:// or https://",
            ));
        }

        if self.backend.timeout_secs == 0 {
            errors.push(ConfigError::error(
                "backend.timeout_secs",
                "timeout must be greater than 0",
            ));
        }

        if self.backend.max_records == 0 {
            errors.push(ConfigError::error(
                "backend.max_records",
                "max_records must be greater than 0",
            ));
        }

        // Anonymous profiles are allowed (health checks) but almost always a mistake.
        if !self.backend.can_connect() {
            errors.push(ConfigError::warning(
                "backend.api_key",
                "no api_key and no user/password configured; the backend will reject data calls",
            ));
        }

        if self.server.transport == McpTransportKind::StreamableHttp {
            if self.server.port == 0 {
                errors.push(ConfigError::error(
                    "server.port",
                    "port must be greater than 0",
                ));
            }
            if self.server.host.is_empty() {
                errors.push(ConfigError::error(
                    "server.host",
                    "host must not be empty",
                ));
            }
        }

        errors
    }

    /// True when [`validate`](Self::validate) reports at least one error.
    pub fn has_errors(&self) -> bool {
        self.validate()
            .iter()
            .any(|e| e.severity == ConfigSeverity::Error)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg: Config = toml::from_str(
            r#"
[backend]
url = "http://file:8069"
max_records = 50
"#,
        )
        .unwrap();

        let issues = cfg.apply_env(env(&[
            ("ODOO_URL", "https://erp.example.com"),
            ("ODOO_API_KEY", "k-1"),
            ("ODOO_MAX_RECORDS", "250"),
            ("MCP_TRANSPORT", "streamable-http"),
            ("MCP_PORT", "9100"),
        ]));

        assert!(issues.is_empty());
        assert_eq!(cfg.backend.url, "https://erp.example.com");
        assert_eq!(cfg.backend.api_key.as_deref(), Some("k-1"));
        assert_eq!(cfg.backend.max_records, 250);
        assert_eq!(cfg.server.transport, McpTransportKind::StreamableHttp);
        assert_eq!(cfg.server.port, 9100);
    }

    #[test]
    fn unparseable_env_values_are_reported_and_ignored() {
        let mut cfg = Config::default();
        let issues = cfg.apply_env(env(&[("ODOO_TIMEOUT", "soon"), ("MCP_PORT", "-1")]));
        assert_eq!(issues.len(), 2);
        assert_eq!(cfg.backend.timeout_secs, 30);
        assert_eq!(cfg.server.port, 8000);
        assert!(issues.iter().all(|i| i.severity == ConfigSeverity::Warning));
    }

    #[test]
    fn default_config_only_warns_about_missing_auth() {
        let issues = Config::default().validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
        assert_eq!(issues[0].field, "backend.api_key");
    }

    #[test]
    fn bad_url_and_zero_timeout_are_errors() {
        let mut cfg = Config::default();
        cfg.backend.url = "erp.example.com".into();
        cfg.backend.timeout_secs = 0;
        cfg.backend.api_key = Some("k".into());
        let issues = cfg.validate();
        assert_eq!(issues.len(), 2);
        assert!(cfg.has_errors());
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError::error("backend.url", "url must not be empty");
        assert_eq!(e.to_string(), "[ERROR] backend.url: url must not be empty");
    }
}
