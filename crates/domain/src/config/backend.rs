use std::fmt;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Odoo backend connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The `[backend]` section: how to reach and authenticate against the
/// Odoo MCP Bridge module.
///
/// An API key is preferred; `user` + `password` is the fallback.  Both may
/// be present, only one is ever sent.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "d_url")]
    pub url: String,
    #[serde(default)]
    pub db: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Upper bound applied to every caller-supplied `limit`.
    #[serde(default = "d_100")]
    pub max_records: u32,
    #[serde(default = "d_30")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: d_url(),
            db: None,
            api_key: None,
            user: None,
            password: None,
            max_records: 100,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn has_credentials(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn can_connect(&self) -> bool {
        self.has_api_key() || self.has_credentials()
    }

    /// A copy safe to print: secrets replaced by `***`.
    pub fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "***".into()),
            password: self.password.as_ref().map(|_| "***".into()),
            ..self.clone()
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self.masked();
        f.debug_struct("BackendConfig")
            .field("url", &masked.url)
            .field("db", &masked.db)
            .field("api_key", &masked.api_key)
            .field("user", &masked.user)
            .field("password", &masked.password)
            .field("max_records", &masked.max_records)
            .field("timeout_secs", &masked.timeout_secs)
            .finish()
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_url() -> String {
    "http://localhost:8069".into()
}
fn d_100() -> u32 {
    100
}
fn d_30() -> u64 {
    30
}
