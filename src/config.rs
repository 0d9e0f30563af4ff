//! Configuration management for the CLI.
//!
//! Loads `nest-client-gen.toml` and merges command-line overrides. Every
//! field has a hard-coded default so the tool runs with no config file and
//! no flags at all; the defaults describe a conventional NestJS layout.

use crate::error::{CliResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "nest-client-gen.toml";

/// Default API path prefix used when the shared constant cannot be resolved.
pub const DEFAULT_API_PREFIX: &str = "api";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source analysis configuration.
    pub source: SourceConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Source analysis configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root directory scanned for controller files.
    pub root: PathBuf,

    /// Glob patterns selecting endpoint-definition files under the root.
    pub globs: Vec<String>,

    /// File exporting the shared path-prefix constant, relative to the root.
    pub constants_file: PathBuf,

    /// Name of the exported path-prefix constant.
    pub prefix_constant: String,

    /// Module alias for qualified references into the shared types module.
    pub types_alias: String,

    /// Suffixes marking bare type names as data objects requiring import.
    pub dto_suffixes: Vec<String>,

    /// Path-parameter binding key injected by client configuration rather
    /// than passed per call.
    pub org_path_key: String,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated client files. Exclusively
    /// generator-owned: its contents are deleted on every run.
    pub dir: PathBuf,

    /// Manifest filename written at the output root.
    pub manifest: String,

    /// Import path of the shared types module, relative to the output root.
    pub types_import: String,

    /// Import path of the hand-authored transport base class.
    pub http_import: String,

    /// Import path of the hand-authored configuration holder.
    pub config_import: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src"),
            globs: vec!["**/*.controller.ts".to_string()],
            constants_file: PathBuf::from("app/app.constants.ts"),
            prefix_constant: "API_PREFIX".to_string(),
            types_alias: "models".to_string(),
            dto_suffixes: vec!["Dto".to_string()],
            org_path_key: "orgCode".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("src/app/api/generated"),
            manifest: "index.ts".to_string(),
            types_import: "../models".to_string(),
            http_import: "../api-http".to_string(),
            config_import: "../api-config".to_string(),
        }
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            // An explicitly named config file must exist.
            if path.is_some() {
                return Err(ConfigError::not_found(config_path).into());
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref root) = args.root {
            config.source.root = root.clone();
        }

        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# nest-client-gen configuration file

[source]
# Root directory scanned for controller files
root = "src"

# Glob patterns selecting endpoint-definition files under the root
globs = ["**/*.controller.ts"]

# File exporting the shared path-prefix constant, relative to the root
constants_file = "app/app.constants.ts"

# Name of the exported path-prefix constant
prefix_constant = "API_PREFIX"

# Module alias for qualified references into the shared types module
types_alias = "models"

# Suffixes marking bare type names as data objects requiring import
dto_suffixes = ["Dto"]

# Path-parameter binding key injected by client configuration, never by the caller
org_path_key = "orgCode"

[output]
# Output directory for generated client files.
# Exclusively generator-owned: its contents are deleted on every run.
dir = "src/app/api/generated"

# Manifest filename written at the output root
manifest = "index.ts"

# Import path of the shared types module, relative to the output root
types_import = "../models"

# Import paths of the hand-authored transport base class and configuration holder
http_import = "../api-http"
config_import = "../api-config"
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Source root override.
    pub root: Option<PathBuf>,

    /// Output directory override.
    pub output: Option<PathBuf>,
}
