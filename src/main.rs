//! # nest-client-gen
//!
//! CLI tool for generating typed TypeScript API clients from NestJS
//! controller sources.
//!
//! ## Usage
//!
//! ```bash
//! # Generate clients using the configured source root
//! nest-client-gen generate
//!
//! # Generate from an explicit source root to a specific output directory
//! nest-client-gen generate --root ./backend/src --output ./frontend/src/api
//!
//! # Dry run to preview the file set
//! nest-client-gen generate --dry-run
//!
//! # Initialize configuration
//! nest-client-gen init
//!
//! # Validate that generated clients are up-to-date
//! nest-client-gen validate
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nest_client_gen::{
    config::{CliArgs, Config, ConfigManager},
    emit::ClientEmitter,
    error::CliError,
    extract::EndpointExtractor,
    model::GeneratedFile,
    parser::{ParsedFile, TsParser},
    scanner::SourceScanner,
    writer::{OutputSynchronizer, SyncResult},
};

#[derive(Parser)]
#[command(name = "nest-client-gen")]
#[command(author, version, about = "Generate typed TypeScript API clients from NestJS controllers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate client classes from controller source files
    Generate {
        /// Source root containing controller files
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Output directory for generated client files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview the generated file set without writing
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize a new nest-client-gen configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = nest_client_gen::config::CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that generated clients are up-to-date
    Validate {
        /// Source root containing controller files
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            root,
            output,
            dry_run,
            config,
        } => cmd_generate(root, output, dry_run, config),

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate { root, config } => cmd_validate(root, config),
    }
}

/// Generate command implementation.
fn cmd_generate(
    root: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, &CliArgs { root, output });

    let Some(files) = render(&config)? else {
        return Ok(());
    };

    let synchronizer = OutputSynchronizer::new(&config.output.dir, dry_run);
    let results = synchronizer.sync(&files)?;

    let mut clients = 0usize;
    for result in &results {
        match result {
            SyncResult::Written { path, bytes } => {
                println!("{} Written {} bytes to {}", "✓".green(), bytes, path.display());
            }
            SyncResult::DryRun { path, content } => {
                println!("{} Would write to {}:", "[dry-run]".yellow(), path.display());
                println!("{}", "─".repeat(60).dimmed());
                println!("{content}");
                println!("{}", "─".repeat(60).dimmed());
            }
        }
        if result.path().extension().map_or(false, |e| e == "ts")
            && result
                .path()
                .to_string_lossy()
                .ends_with(".client.ts")
        {
            clients += 1;
        }
    }

    println!(
        "{} Generated {} client class(es)",
        "✓".green(),
        clients.to_string().green()
    );

    Ok(())
}

/// Run the analysis pipeline and render the full generated file set.
///
/// Returns `None` when there is nothing to generate (no matching files),
/// which is a clean, successful outcome.
fn render(config: &Config) -> Result<Option<Vec<GeneratedFile>>, CliError> {
    println!("{}", "Scanning for controller files...".cyan());

    let scanner = SourceScanner::new(&config.source.root, &config.source.globs)
        .map_err(CliError::Scan)?;
    let sources = scanner.scan_allow_empty()?;

    if sources.is_empty() {
        println!("{}", "No controller files found.".yellow());
        return Ok(None);
    }

    println!(
        "  Found {} controller file(s)",
        sources.len().to_string().green()
    );

    println!("{}", "Parsing controllers...".cyan());

    let mut parser = TsParser::new()?;
    let (parsed, errors) = parser.parse_files(&sources);

    // Files that fail to parse are skipped; the rest still generate.
    if !errors.is_empty() {
        println!(
            "{} Skipped {} file(s) with parse errors:",
            "Warning:".yellow(),
            errors.len()
        );
        for error in &errors {
            println!("  {error}");
        }
    }

    let constants = load_constants(&scanner, &mut parser, config);

    let extractor = EndpointExtractor::new(&config.source);
    let prefix = extractor.shared_prefix(constants.as_ref());
    let groups = extractor.extract(&parsed, &prefix);

    if groups.is_empty() {
        println!("{}", "No controller classes with endpoints found.".yellow());
        return Ok(None);
    }

    let endpoints: usize = groups.iter().map(|g| g.endpoints.len()).sum();
    println!(
        "  Found {} endpoint group(s), {} endpoint(s)",
        groups.len().to_string().green(),
        endpoints.to_string().green()
    );

    println!("{}", "Generating client classes...".cyan());

    let emitter = ClientEmitter::new(&config.output);
    Ok(Some(emitter.emit(&groups)))
}

/// Parse the shared constants file, if present and parseable.
///
/// Its absence or failure to parse is not an error; the prefix fallback
/// applies instead.
fn load_constants(
    scanner: &SourceScanner,
    parser: &mut TsParser,
    config: &Config,
) -> Option<ParsedFile> {
    let source = scanner.read_file(&config.source.constants_file)?;
    match parser.parse_file(&source) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            println!(
                "{} Could not parse constants file, using default prefix: {e}",
                "Warning:".yellow()
            );
            None
        }
    }
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    let content = ConfigManager::default_config_content();
    std::fs::write(&output, content)?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Validate command implementation.
///
/// Re-renders the full file set in memory and compares it against the
/// output directory: changed, missing, and stale files all fail.
fn cmd_validate(root: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<(), CliError> {
    println!("{}", "Validating generated clients...".cyan());

    let config = ConfigManager::load(config_path.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, &CliArgs { root, output: None });

    let rendered = render(&config)?.unwrap_or_default();

    let expected: BTreeMap<PathBuf, &str> = rendered
        .iter()
        .map(|f| (f.relative_path.clone(), f.contents.as_str()))
        .collect();

    let mut problems = Vec::new();

    for (relative, contents) in &expected {
        let path = config.output.dir.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(on_disk) if on_disk == *contents => {}
            Ok(_) => problems.push(format!("changed: {}", relative.display())),
            Err(_) => problems.push(format!("missing: {}", relative.display())),
        }
    }

    for relative in existing_files(&config.output.dir) {
        if !expected.contains_key(&relative) {
            problems.push(format!("stale: {}", relative.display()));
        }
    }

    if problems.is_empty() {
        println!("{} Generated clients are up-to-date", "✓".green());
        Ok(())
    } else {
        for problem in &problems {
            println!("  {} {problem}", "✗".red());
        }
        println!("  Run 'nest-client-gen generate' to update");
        Err(CliError::Validation(
            "Generated clients are out of date".to_string(),
        ))
    }
}

/// List files currently present under the output directory.
fn existing_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }

    ignore::WalkBuilder::new(dir)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .hidden(false)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect()
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
