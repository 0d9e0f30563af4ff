//! # nest-client-gen
//!
//! CLI library for generating typed TypeScript API clients from NestJS
//! controller sources.
//!
//! This crate provides the core functionality for the `nest-client-gen`
//! tool: controller file scanning, TypeScript parsing, endpoint
//! extraction, client emission, and output synchronization.
//!
//! ## Architecture
//!
//! The library is organized into several modules, one per pipeline stage:
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`scanner`] - Controller file discovery and filtering
//! - [`parser`] - TypeScript source parsing into a semantic model
//! - [`resolve`] - Type-expression resolution and import collection
//! - [`extract`] - Controller discovery, endpoint extraction, parameter
//!   classification
//! - [`emit`] - Client-class and manifest rendering
//! - [`writer`] - Output directory synchronization and dry-run support
//! - [`error`] - Error types and handling

pub mod config;
pub mod emit;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod scanner;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use emit::ClientEmitter;
pub use error::{CliError, CliResult};
pub use extract::EndpointExtractor;
pub use model::{Endpoint, EndpointGroup, GeneratedFile};
pub use parser::{ParsedFile, TsParser};
pub use resolve::TypeResolver;
pub use scanner::{SourceFile, SourceScanner};
pub use writer::OutputSynchronizer;
