use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ease_api::Api;
use ease_parser::{Registry, Type};
use ease_source::{DeclarationUnit, Scanner};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod flags;
mod report;

pub use config::{EaseConfig, DEFAULT_CONFIG_FILE};
use flags::PolicyFlag;
use report::{ApiReport, InspectReport, ResolveReport};

#[derive(Parser)]
#[command(name = "ease")]
#[command(
    about = "Read Go declarations, resolve service constructors and list annotated endpoints",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (defaults to ./ease.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Loader threads
    #[arg(long, global = true)]
    jobs: Option<usize>,

    /// Constructor selection when several functions return the same type
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyFlag>,

    /// Directive prefix, `ease` matches `//ease:api ...`
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump packages, types and functions with their docs and directives
    Inspect(SourceArgs),

    /// Print the ordered constructor calls building the given types
    Resolve(ResolveArgs),

    /// List annotated endpoints and the constructors of their services
    Api(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Package patterns: a directory, or `dir/...` for every package below it
    #[arg(default_value = "./...")]
    patterns: Vec<String>,

    /// Read declaration units from a JSON file instead of scanning sources
    #[arg(long, conflicts_with = "patterns")]
    units: Option<PathBuf>,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Fully-qualified target type, e.g. `example.com/app/todo.Service`
    #[arg(long = "type", required = true)]
    types: Vec<String>,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let cwd = env::current_dir().context("Failed to read current directory")?;
    let mut config = EaseConfig::load(cli.config.as_deref(), &cwd)?;
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if let Some(policy) = cli.policy {
        config.parser.producer_policy = policy.as_domain();
    }
    if let Some(prefix) = &cli.prefix {
        config.parser.directive_prefix = prefix.clone();
    }
    config.validate()?;

    match &cli.command {
        Commands::Inspect(args) => {
            let registry = load_registry(&config, args)?;
            print_json(&InspectReport::build(&registry), cli.pretty)
        }
        Commands::Resolve(args) => {
            let registry = load_registry(&config, &args.source)?;
            let targets: Vec<Arc<Type>> = args
                .types
                .iter()
                .map(|fqn| type_ref(&registry, fqn))
                .collect();
            let resolution = registry
                .resolve(&targets)
                .context("Constructor resolution failed")?;
            print_json(&ResolveReport::build(&targets, &resolution), cli.pretty)
        }
        Commands::Api(args) => {
            let registry = load_registry(&config, args)?;
            let api = Api::from_registry(&registry).context("Invalid api directive")?;
            let plan = api.plan(&registry).context("Service resolution failed")?;
            print_json(&ApiReport::build(&api, &plan), cli.pretty)
        }
    }
}

fn load_registry(config: &EaseConfig, args: &SourceArgs) -> Result<Registry> {
    let units = match &args.units {
        Some(path) => DeclarationUnit::load_json(path)
            .with_context(|| format!("Failed to load units from {}", path.display()))?,
        None => Scanner::new(config.source.clone())?
            .scan_all(&args.patterns)
            .context("Failed to scan Go sources")?,
    };

    let registry = Registry::new(config.parser.clone())?;
    registry.load_all(&units, config.jobs);
    Ok(registry)
}

/// `path.Name` to a registry type, a bare name is a built-in
fn type_ref(registry: &Registry, fqn: &str) -> Arc<Type> {
    match fqn.rsplit_once('.') {
        Some((path, name)) => registry.ty(Some(&registry.package(path)), name),
        None => registry.ty(None, fqn),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
