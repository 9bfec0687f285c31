use ob_domain::config::{Config, ConfigError, ConfigSeverity};

/// Validate the config and print any issues, including environment
/// overrides that could not be applied.
///
/// Returns `true` when no errors were found (warnings are allowed).
pub fn validate(config: &Config, config_path: &str, env_issues: &[ConfigError]) -> bool {
    let issues: Vec<ConfigError> = env_issues
        .iter()
        .cloned()
        .chain(config.validate())
        .collect();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Render the resolved config as TOML with secrets masked.
pub fn render(config: &Config) -> anyhow::Result<String> {
    let mut safe = config.clone();
    safe.backend = safe.backend.masked();
    Ok(toml::to_string_pretty(&safe)?)
}

/// Print the resolved config (with all defaults filled in).
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}
