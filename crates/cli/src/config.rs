//! CLI configuration utilities

use anyhow::{Context, Result};
use club_core::ClientConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

/// Load the client configuration
///
/// An explicit path must exist; otherwise `<data_dir>/config.toml` is used
/// when present, and defaults plus environment when it is not. A data
/// directory given on the command line wins over the configured one.
pub fn load_config(explicit: Option<&Path>, data_dir: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match explicit {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let default_path = default_config_path(data_dir);
            if default_path.is_file() {
                ClientConfig::from_file(&default_path).with_context(|| {
                    format!("Failed to load configuration from {}", default_path.display())
                })?
            } else {
                ClientConfig::from_env().context("Failed to load configuration")?
            }
        }
    };

    if let Some(dir) = data_dir {
        config.storage.data_dir = dir.to_path_buf();
    }
    Ok(config)
}

pub fn default_config_path(data_dir: Option<&Path>) -> PathBuf {
    data_dir.map_or_else(
        || club_core::StorageConfig::default().data_dir,
        Path::to_path_buf,
    )
    .join(CONFIG_FILE)
}

/// Render a configuration as TOML
pub fn render_config(config: &ClientConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P, force: bool) -> Result<()> {
    let path = path.as_ref();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = render_config(&ClientConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
