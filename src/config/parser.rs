use crate::config::types::MirrorConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(MirrorConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Pool size: {}", config.crawl.max_concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<MirrorConfig, ConfigError> {
    let mut config: MirrorConfig = toml::from_str(content)?;
    config.crawl.output_dir = expand_path(&config.crawl.output_dir);

    validate(&config)?;

    Ok(config)
}

/// Expands a leading `~` to the user's home directory
///
/// Paths without a tilde, or systems without `HOME`, are returned unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
