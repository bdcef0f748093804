mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load configuration from a TOML file
///
/// `url` and `api_key` may reference environment variables (`$RADARR_KEY`)
/// and a leading `~`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_instances(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./arrlink.toml",
        "~/.config/arrlink/config.toml",
        "/etc/arrlink/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand_instances(config: &mut Config) -> Result<()> {
    for instance in &mut config.instances {
        instance.url = shellexpand::full(&instance.url)
            .with_context(|| format!("Failed to expand url of instance '{}'", instance.name))?
            .into_owned();
        instance.api_key = shellexpand::full(&instance.api_key)
            .with_context(|| format!("Failed to expand api_key of instance '{}'", instance.name))?
            .into_owned();
    }
    Ok(())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    let mut names = HashSet::new();
    for instance in &config.instances {
        if !names.insert(instance.name.as_str()) {
            anyhow::bail!("Instance name '{}' is used more than once", instance.name);
        }
        if !instance.url.starts_with("http://") && !instance.url.starts_with("https://") {
            anyhow::bail!(
                "Instance '{}' has an invalid url '{}': expected http:// or https://",
                instance.name,
                instance.url
            );
        }
        if instance.enabled && instance.api_key.is_empty() {
            anyhow::bail!("Instance '{}' is enabled but has no API key", instance.name);
        }
        if instance.timeout_secs == 0 {
            anyhow::bail!("Instance '{}' timeout cannot be 0", instance.name);
        }
    }

    Ok(())
}
