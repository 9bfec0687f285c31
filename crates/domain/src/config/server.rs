use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MCP server (agent-facing side)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: McpTransportKind,
    /// Bind host for the `streamable-http` transport.
    #[serde(default = "d_host")]
    pub host: String,
    /// Bind port for the `streamable-http` transport.
    #[serde(default = "d_8000")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: McpTransportKind::Stdio,
            host: d_host(),
            port: 8000,
        }
    }
}

/// How tool calls reach the bridge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum McpTransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    StreamableHttp,
}

impl McpTransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            McpTransportKind::Stdio => "stdio",
            McpTransportKind::StreamableHttp => "streamable-http",
        }
    }
}

impl fmt::Display for McpTransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for McpTransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(McpTransportKind::Stdio),
            "streamable-http" | "http" => Ok(McpTransportKind::StreamableHttp),
            other => Err(format!(
                "unknown transport \"{other}\" (expected stdio or streamable-http)"
            )),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_host() -> String {
    "localhost".into()
}
fn d_8000() -> u16 {
    8000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_parses_both_spellings() {
        assert_eq!("stdio".parse::<McpTransportKind>(), Ok(McpTransportKind::Stdio));
        assert_eq!(
            "Streamable-HTTP".parse::<McpTransportKind>(),
            Ok(McpTransportKind::StreamableHttp)
        );
        assert!("sse".parse::<McpTransportKind>().is_err());
    }

    #[test]
    fn transport_deserializes_kebab_case() {
        let cfg: ServerConfig = toml::from_str(r#"transport = "streamable-http""#).unwrap();
        assert_eq!(cfg.transport, McpTransportKind::StreamableHttp);
        assert_eq!(cfg.port, 8000);
    }
}
