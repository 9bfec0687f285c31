use serde_json::Value;

use ob_backend::{BackendClient, RecordStore};
use ob_domain::config::Config;

/// Probe the backend and print a summary.
///
/// Returns `Ok(true)` when the backend answered the health probe.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("odoo-mcp-bridge check");
    println!("=====================\n");

    let client = BackendClient::from_config(&config.backend)?;

    print_check("Config", true, config_path.to_owned());
    print_check(
        "Backend URL",
        true,
        format!(
            "{} (db: {})",
            client.profile().base_url,
            client.profile().database.as_deref().unwrap_or("-")
        ),
    );
    print_check(
        "Authentication",
        config.backend.can_connect(),
        client.auth_mode().as_str().to_owned(),
    );

    let health = client.health().await;
    let reachable = health_ok(&health);
    print_check("Health probe", reachable, summarize(&health));

    if reachable {
        match client.server_info().await {
            Ok(info) => print_check("Server info", true, summarize(&info)),
            Err(e) => print_check("Server info", false, e.untagged().to_string()),
        }
    }

    client.shutdown().await;

    println!();
    if reachable {
        println!("Backend reachable.");
    } else {
        println!("Backend unreachable. Review the output above.");
    }
    Ok(reachable)
}

fn health_ok(health: &Value) -> bool {
    health.get("status").and_then(Value::as_str) != Some("error")
}

fn summarize(v: &Value) -> String {
    match v.get("message").and_then(Value::as_str) {
        Some(msg) if !health_ok(v) => msg.to_owned(),
        _ => v.to_string(),
    }
}

fn print_check(name: &str, ok: bool, detail: String) {
    let mark = if ok { "PASS" } else { "FAIL" };
    println!("  [{mark}] {name}: {detail}");
}
