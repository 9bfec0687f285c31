use ob_domain::config::{Config, McpTransportKind};

#[test]
fn default_backend_points_at_local_odoo() {
    let config = Config::default();
    assert_eq!(config.backend.url, "http://localhost:8069");
    assert_eq!(config.backend.max_records, 100);
    assert_eq!(config.backend.timeout_secs, 30);
    assert!(config.backend.db.is_none());
}

#[test]
fn default_transport_is_stdio() {
    let config = Config::default();
    assert_eq!(config.server.transport, McpTransportKind::Stdio);
    assert_eq!(config.server.host, "localhost");
    assert_eq!(config.server.port, 8000);
}

#[test]
fn partial_backend_section_keeps_defaults() {
    let toml_str = r#"
[backend]
url = "https://erp.example.com"
db = "prod"
user = "admin"
password = "secret"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.backend.url, "https://erp.example.com");
    assert_eq!(config.backend.db.as_deref(), Some("prod"));
    assert!(config.backend.has_credentials());
    assert!(!config.backend.has_api_key());
    assert_eq!(config.backend.timeout_secs, 30);
}

#[test]
fn http_transport_parses_from_toml() {
    let toml_str = r#"
[server]
transport = "streamable-http"
host = "0.0.0.0"
port = 9000
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.transport, McpTransportKind::StreamableHttp);
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn masked_config_serializes_without_secrets() {
    let toml_str = r#"
[backend]
api_key = "live-key"
password = "pw"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let shown = toml::to_string(&config.backend.masked()).unwrap();
    assert!(!shown.contains("live-key"));
    assert!(!shown.contains("\"pw\""));
    assert!(shown.contains("***"));
}
