//! Error types for the CLI.
//!
//! Each pipeline stage has its own error enum; `CliError` unifies them.
//! The taxonomy mirrors how failures are handled: a missing source root is
//! fatal, a file that fails to parse is skipped with a warning, and type
//! resolution never fails at all (unresolvable expressions degrade to `any`).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error during source file scanning.
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    /// Error during TypeScript source parsing.
    #[error("Failed to parse source file: {0}")]
    Parse(#[from] ParseError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error writing the output tree.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// Validation failed (generated clients out of date).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during source file scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Source root does not exist. Fatal: there is nothing to generate from.
    #[error("Source root not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// No controller files matched the configured globs.
    #[error("No controller files found in: {path}")]
    NoControllerFiles { path: PathBuf },

    /// Invalid glob pattern in configuration.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error during scanning.
    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from ignore crate walker.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error during TypeScript source parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("Failed to initialize TypeScript grammar: {0}")]
    Language(String),

    /// Syntax error in a source file. The file is skipped; others continue.
    #[error("Syntax error in {file}: {message}")]
    Syntax { file: PathBuf, message: String },

    /// IO error reading file.
    #[error("Failed to read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing the output tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to clear existing generated files.
    #[error("Failed to clear output directory {path}: {source}")]
    Clear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Create a syntax error for a file.
    pub fn syntax(file: PathBuf, message: impl Into<String>) -> Self {
        Self::Syntax {
            file,
            message: message.into(),
        }
    }
}

impl ScanError {
    /// Create a source-root-not-found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    /// Create a no-controller-files error.
    pub fn no_controller_files(path: PathBuf) -> Self {
        Self::NoControllerFiles { path }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }
}
