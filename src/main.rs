use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use doc_directives::app::engine::AnnotationEngine;
use doc_directives::cli;
use doc_directives::domain::entity::Inspection;
use doc_directives::domain::grammar::{DEFAULT_SEPARATOR, ScanConfig};
use doc_directives::domain::reader::ReadPolicy;
use doc_directives::server::{http, mcp::DirectiveMcpServer};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ddtool",
    version,
    about = "Read, validate and generate code from doc-comment directives"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_SEPARATOR,
        help = "Separator between directive arguments"
    )]
    separator: char,
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the directive tree of an inspection JSON file.
    Read {
        file: PathBuf,
        #[arg(long, help = "Report every offending entity instead of stopping at the first")]
        collect_all: bool,
        #[arg(long, help = "Single-line JSON output")]
        compact: bool,
    },
    /// Extract directives from loose comment lines.
    Extract {
        #[arg(long, help = "Read comment lines from a file instead of arguments or stdin")]
        file: Option<PathBuf>,
        #[arg(long, help = "Also report lines that are not directives")]
        all_lines: bool,
        lines: Vec<String>,
    },
    /// Validate every directive with the given identifier.
    Check {
        file: PathBuf,
        identifier: String,
        #[arg(long = "require", value_name = "KEY", help = "Attribute that must be present")]
        required: Vec<String>,
        #[arg(
            long = "match",
            value_name = "KEY=REGEX",
            value_parser = parse_key_pattern,
            help = "Attribute whose whole value must match REGEX"
        )]
        patterns: Vec<(String, String)>,
        #[arg(long)]
        collect_all: bool,
    },
    /// Generate the routing() file from chariot.route directives.
    Routes { file: PathBuf },
    /// Show a type or function by name.
    Lookup { file: PathBuf, name: String },
    /// Serve the HTTP API.
    Serve {
        file: PathBuf,
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
    /// Serve MCP tools over stdio.
    Mcp { file: PathBuf },
}

fn parse_key_pattern(s: &str) -> Result<(String, String), String> {
    cli::parse_key_pattern(s).map_err(|e| e.to_string())
}

fn policy(collect_all: bool) -> ReadPolicy {
    if collect_all {
        ReadPolicy::CollectAll
    } else {
        ReadPolicy::FailFast
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(file: &Path, config: ScanConfig) -> Result<AnnotationEngine> {
    AnnotationEngine::load_from_json(file, config)
        .with_context(|| format!("Failed to load inspection from {}", file.display()))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

fn run(cli: Cli) -> Result<bool> {
    let config = ScanConfig::new(cli.separator)?;

    match cli.command {
        Commands::Read {
            file,
            collect_all,
            compact,
        } => {
            let engine = load(&file, config)?;
            cli::print_annotations(&engine, policy(collect_all), compact)?;
            Ok(true)
        }
        Commands::Extract {
            file,
            all_lines,
            lines,
        } => {
            let lines = cli::collect_lines(file.as_deref(), &lines)?;
            let engine = AnnotationEngine::from_inspection(Inspection::default(), config);
            cli::extract_lines(&engine, lines, all_lines)
        }
        Commands::Check {
            file,
            identifier,
            required,
            patterns,
            collect_all,
        } => {
            let engine = load(&file, config)?;
            cli::check_directives(
                &engine,
                &identifier,
                &required,
                &patterns,
                policy(collect_all),
            )
        }
        Commands::Routes { file } => {
            let engine = load(&file, config)?;
            cli::print_routes(&engine)?;
            Ok(true)
        }
        Commands::Lookup { file, name } => {
            let engine = load(&file, config)?;
            cli::lookup_entity(&engine, &name)?;
            Ok(true)
        }
        Commands::Serve { file, addr } => {
            let engine = load(&file, config)?;
            runtime()?.block_on(http::serve(engine, addr))?;
            Ok(true)
        }
        Commands::Mcp { file } => {
            let engine = load(&file, config)?;
            runtime()?.block_on(DirectiveMcpServer::new(engine).serve_stdio())?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
