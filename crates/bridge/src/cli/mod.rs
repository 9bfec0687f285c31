pub mod check;
pub mod config;

use clap::{Parser, Subcommand};

use ob_domain::config::{Config, ConfigError, McpTransportKind};

/// Odoo MCP Bridge: exposes an Odoo database to MCP clients.
#[derive(Debug, Parser)]
#[command(name = "odoo-mcp-bridge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the MCP server (default when no subcommand is given).
    Serve(ServeArgs),
    /// Probe the backend and report the connection status.
    Check,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

/// Overrides for the `[server]` section.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ServeArgs {
    /// Transport: stdio or streamable-http.
    #[arg(long)]
    pub transport: Option<McpTransportKind>,
    /// Bind host for streamable-http.
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port for streamable-http.
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(t) = self.transport {
            config.server.transport = t;
        }
        if let Some(h) = &self.host {
            config.server.host = h.clone();
        }
        if let Some(p) = self.port {
            config.server.port = p;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML, secrets masked.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// The resolved configuration and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: String,
    /// Environment overrides that could not be applied.
    pub env_issues: Vec<ConfigError>,
}

/// Load the configuration from the path specified by `OB_CONFIG` (or
/// `config.toml` by default), then overlay `ODOO_*` / `MCP_*` environment
/// variables.  A `.env` file in the working directory is read first.
///
/// A missing config file is not an error; defaults are used.
pub fn load_config() -> anyhow::Result<LoadedConfig> {
    // Absent .env is the normal case.
    let _ = dotenvy::dotenv();

    let path = std::env::var("OB_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config: Config = if std::path::Path::new(&path).exists() {
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))?
    } else {
        Config::default()
    };

    let env_issues = config.apply_env(|key| std::env::var(key).ok());

    Ok(LoadedConfig {
        config,
        path,
        env_issues,
    })
}
