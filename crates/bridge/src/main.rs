use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;

use ob_bridge::cli::{Cli, Command, ConfigCommand, ServeArgs};
use ob_domain::config::ObservabilityConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None => serve(ServeArgs::default()).await,
        Some(Command::Serve(args)) => serve(args).await,
        Some(Command::Check) => {
            init_cli_tracing();
            let loaded = ob_bridge::cli::load_config()?;
            let reachable = ob_bridge::cli::check::run(&loaded.config, &loaded.path).await?;
            if !reachable {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let loaded = ob_bridge::cli::load_config()?;
            let valid =
                ob_bridge::cli::config::validate(&loaded.config, &loaded.path, &loaded.env_issues);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let loaded = ob_bridge::cli::load_config()?;
            ob_bridge::cli::config::show(&loaded.config)
        }
        Some(Command::Version) => {
            println!("odoo-mcp-bridge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut loaded = ob_bridge::cli::load_config()?;
    args.apply(&mut loaded.config);

    let tracer_provider = init_tracing(&loaded.config.observability);
    for issue in &loaded.env_issues {
        tracing::warn!(%issue, "environment override ignored");
    }
    for issue in loaded.config.validate() {
        tracing::warn!(%issue, config = %loaded.path, "config issue");
    }
    if loaded.config.has_errors() {
        anyhow::bail!("invalid configuration in {}; run `odoo-mcp-bridge config validate`", loaded.path);
    }

    let result = ob_bridge::serve::run(&loaded.config).await;

    // Flush pending spans before the process exits.
    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = ?e, "OpenTelemetry tracer provider shutdown failed");
        }
    }

    result
}

/// Initialize structured JSON tracing for `serve`.
///
/// Logs always go to stderr: stdout carries the stdio protocol.  When
/// `otlp_endpoint` is configured an OpenTelemetry layer is added; the
/// returned provider must be shut down on exit to flush pending spans.
fn init_tracing(obs: &ObservabilityConfig) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ob_backend=debug,ob_mcp=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr);

    match &obs.otlp_endpoint {
        Some(endpoint) => {
            let exporter = match opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()
            {
                Ok(e) => e,
                Err(e) => {
                    eprintln!(
                        "WARNING: failed to create OTLP exporter for {endpoint}: {e}; \
                         starting without OpenTelemetry"
                    );
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt_layer)
                        .init();
                    return None;
                }
            };

            let resource = opentelemetry_sdk::Resource::builder()
                .with_service_name(obs.service_name.clone())
                .build();

            let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .with_sampler(opentelemetry_sdk::trace::Sampler::TraceIdRatioBased(
                    obs.sample_rate,
                ))
                .with_resource(resource)
                .build();

            let otel_layer =
                tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("odoo-mcp-bridge"));

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(otel_layer)
                .init();

            Some(tracer_provider)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();

            None
        }
    }
}

/// Compact stderr-only tracing for one-shot commands.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
