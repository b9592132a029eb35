//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.triage/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::engine::DEFAULT_RESTART_MARKER;
use crate::core::storage;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub start_node: Option<String>,
    pub show_section: Option<bool>,
    pub debug_mode: Option<bool>,
    pub restart_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistoryConfig {
    pub allow_save: Option<bool>,
    pub prefix: Option<String>,
    pub dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub path: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_START_NODE: &str = "0.0";
pub const DEFAULT_PREFIX: &str = "triage";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub start_node: String,
    pub show_section: bool,
    pub debug_mode: bool,
    /// `None` disables restart semantics.
    pub restart_marker: Option<String>,
    pub allow_save: bool,
    pub prefix: String,
    pub history_dir: PathBuf,
    /// `None` means the bundled catalog.
    pub catalog_path: Option<PathBuf>,
}

/// Built-in defaults only. `TRIAGE_*` environment variables are ignored.
impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&TriageConfig::default(), &CliOverrides::default(), |_| None)
    }
}

/// Values supplied on the command line. `None` / `false` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub catalog: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
    pub start_node: Option<String>,
    pub no_save: bool,
    pub debug: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.triage/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    storage::data_dir().ok().map(|d| d.join("config.toml"))
}

/// Load config from `~/.triage/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TriageConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TriageConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TriageConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TriageConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<TriageConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: TriageConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Triage Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# start_node = "0.0"                 # Or set TRIAGE_START_NODE env var
# show_section = true                # Show the section breadcrumb above each question
# debug_mode = false                 # Show the step table for the live session
# restart_marker = "(start over)"    # Choices containing this text clear the path; "" disables

# [history]
# allow_save = true                  # Offer to log a session when it reaches an end node
# prefix = "triage"                  # Or set TRIAGE_PREFIX env var
# dir = "/home/me/.triage/history"   # Or set TRIAGE_HISTORY_DIR env var

# [catalog]
# path = "/path/to/tree.json"        # Or set TRIAGE_CATALOG env var; bundled tree if unset
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TriageConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, env_var)
}

/// `resolve` with the environment lookup supplied by the caller.
pub fn resolve_with(
    config: &TriageConfig,
    cli: &CliOverrides,
    env_var: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Start node: CLI → env → config → default
    let start_node = cli
        .start_node
        .clone()
        .or_else(|| env_var("TRIAGE_START_NODE"))
        .or_else(|| config.general.start_node.clone())
        .unwrap_or_else(|| DEFAULT_START_NODE.to_string());

    // Catalog: CLI → env → config → bundled
    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| env_var("TRIAGE_CATALOG").map(PathBuf::from))
        .or_else(|| config.catalog.path.as_ref().map(PathBuf::from));

    // History dir: CLI → env → config → ~/.triage/history → ./.triage/history
    let history_dir = cli
        .history_dir
        .clone()
        .or_else(|| env_var("TRIAGE_HISTORY_DIR").map(PathBuf::from))
        .or_else(|| config.history.dir.as_ref().map(PathBuf::from))
        .or_else(|| storage::default_history_dir().ok())
        .unwrap_or_else(|| PathBuf::from(".triage").join("history"));

    // Prefix: env → config → default
    let prefix = env_var("TRIAGE_PREFIX")
        .or_else(|| config.history.prefix.clone())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    // Restart marker: an explicit empty string turns restarts off
    let restart_marker = match &config.general.restart_marker {
        Some(marker) if marker.is_empty() => None,
        Some(marker) => Some(marker.clone()),
        None => Some(DEFAULT_RESTART_MARKER.to_string()),
    };

    ResolvedConfig {
        start_node,
        show_section: config.general.show_section.unwrap_or(true),
        debug_mode: cli.debug || config.general.debug_mode.unwrap_or(false),
        restart_marker,
        allow_save: !cli.no_save && config.history.allow_save.unwrap_or(true),
        prefix,
        history_dir,
        catalog_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = TriageConfig::default();
        assert!(config.general.start_node.is_none());
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&TriageConfig::default(), &CliOverrides::default());
        assert!(resolved.show_section);
        assert!(resolved.allow_save);
        assert_eq!(resolved.restart_marker.as_deref(), Some(DEFAULT_RESTART_MARKER));
    }

    #[test]
    fn test_env_sits_between_config_and_cli() {
        let env = |name: &str| match name {
            "TRIAGE_START_NODE" => Some("2.0".to_string()),
            "TRIAGE_PREFIX" => Some("ATHD".to_string()),
            _ => None,
        };
        let config = TriageConfig {
            general: GeneralConfig {
                start_node: Some("1.0".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.start_node, "2.0");
        assert_eq!(resolved.prefix, "ATHD");

        let cli = CliOverrides {
            start_node: Some("3.0".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_with(&config, &cli, env).start_node, "3.0");
    }

    #[test]
    fn test_default_ignores_environment() {
        let resolved = ResolvedConfig::default();
        assert_eq!(resolved.start_node, DEFAULT_START_NODE);
        assert_eq!(resolved.prefix, DEFAULT_PREFIX);
        assert_eq!(resolved.catalog_path, None);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = TriageConfig {
            general: GeneralConfig {
                show_section: Some(false),
                debug_mode: Some(true),
                restart_marker: Some("[restart]".to_string()),
                ..Default::default()
            },
            history: HistoryConfig {
                allow_save: Some(false),
                dir: Some("/tmp/triage-history".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert!(!resolved.show_section);
        assert!(resolved.debug_mode);
        assert!(!resolved.allow_save);
        assert_eq!(resolved.restart_marker.as_deref(), Some("[restart]"));
        assert_eq!(resolved.history_dir, PathBuf::from("/tmp/triage-history"));
    }

    #[test]
    fn test_empty_restart_marker_disables_restart() {
        let config = TriageConfig {
            general: GeneralConfig {
                restart_marker: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, &CliOverrides::default()).restart_marker, None);
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = TriageConfig {
            general: GeneralConfig {
                start_node: Some("1.0".to_string()),
                ..Default::default()
            },
            catalog: CatalogConfig {
                path: Some("from-config.json".to_string()),
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            catalog: Some(PathBuf::from("from-cli.json")),
            start_node: Some("2.0".to_string()),
            no_save: true,
            ..Default::default()
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.start_node, "2.0");
        assert_eq!(resolved.catalog_path, Some(PathBuf::from("from-cli.json")));
        assert!(!resolved.allow_save);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
start_node = "1.0"
show_section = false
restart_marker = "(start over)"

[history]
allow_save = true
prefix = "ATHD"

[catalog]
path = "tree.json"
"#;
        let config: TriageConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.start_node.as_deref(), Some("1.0"));
        assert_eq!(config.general.show_section, Some(false));
        assert_eq!(config.history.prefix.as_deref(), Some("ATHD"));
        assert_eq!(config.catalog.path.as_deref(), Some("tree.json"));
        assert!(config.general.debug_mode.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[history]
allow_save = false
"#;
        let config: TriageConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.history.allow_save, Some(false));
        assert!(config.history.prefix.is_none());
        assert!(config.general.start_node.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\ndebug_mode = true\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.general.debug_mode, Some(true));

        fs::write(&path, "[general\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
