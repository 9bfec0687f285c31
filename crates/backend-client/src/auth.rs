//! Authentication mode selection.
//!
//! The bridge module accepts credentials inside the JSON-RPC `params`, not
//! as headers.  Exactly one mode is sent per request:
//!
//! | Profile has                | Injected fields        |
//! |----------------------------|------------------------|
//! | non-empty `api_key`        | `api_key`              |
//! | non-empty user + password  | `user`, `password`     |
//! | neither                    | nothing (anonymous)    |
//!
//! Anonymous calls are not rejected locally; the backend's authentication
//! error comes back through the normal reply path.

use serde_json::{Map, Value};

use crate::profile::ConnectionProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    ApiKey,
    Credentials,
    Anonymous,
}

impl AuthMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::ApiKey => "api_key",
            AuthMode::Credentials => "user/password",
            AuthMode::Anonymous => "anonymous",
        }
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Which mode a profile resolves to.
pub fn auth_mode(profile: &ConnectionProfile) -> AuthMode {
    if non_empty(&profile.api_key).is_some() {
        AuthMode::ApiKey
    } else if non_empty(&profile.username).is_some() && non_empty(&profile.password).is_some() {
        AuthMode::Credentials
    } else {
        AuthMode::Anonymous
    }
}

/// The fields to merge into an envelope's `params`.
pub fn auth_fields(profile: &ConnectionProfile) -> Map<String, Value> {
    let mut fields = Map::new();
    match auth_mode(profile) {
        AuthMode::ApiKey => {
            if let Some(key) = non_empty(&profile.api_key) {
                fields.insert("api_key".into(), Value::String(key.to_owned()));
            }
        }
        AuthMode::Credentials => {
            if let (Some(user), Some(pw)) = (non_empty(&profile.username), non_empty(&profile.password)) {
                fields.insert("user".into(), Value::String(user.to_owned()));
                fields.insert("password".into(), Value::String(pw.to_owned()));
            }
        }
        AuthMode::Anonymous => {}
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base() -> ConnectionProfile {
        ConnectionProfile::new("http://odoo", Duration::from_secs(1))
    }

    #[test]
    fn api_key_wins_over_credentials() {
        let p = base().with_api_key("k").with_credentials("admin", "pw");
        let fields = auth_fields(&p);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["api_key"], "k");
        assert_eq!(auth_mode(&p), AuthMode::ApiKey);
    }

    #[test]
    fn credentials_only() {
        let p = base().with_credentials("admin", "pw");
        let fields = auth_fields(&p);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["user"], "admin");
        assert_eq!(fields["password"], "pw");
        assert!(!fields.contains_key("api_key"));
    }

    #[test]
    fn neither_yields_empty_mapping() {
        let p = base();
        assert!(auth_fields(&p).is_empty());
        assert_eq!(auth_mode(&p), AuthMode::Anonymous);
    }

    #[test]
    fn empty_api_key_falls_through_to_credentials() {
        let p = base().with_api_key("").with_credentials("admin", "pw");
        assert_eq!(auth_mode(&p), AuthMode::Credentials);
    }

    #[test]
    fn user_without_password_is_anonymous() {
        let mut p = base();
        p.username = Some("admin".into());
        assert!(auth_fields(&p).is_empty());
    }
}
