//! dbmeta CLI - Firebird schema export and script-driven build/update.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use dbmeta::error::EXIT_USAGE_ERROR;
use dbmeta::{ApplyResult, Config, ExportResult, MetaError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dbmeta")]
#[command(about = "Firebird schema export and script-driven database build/update")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Optional YAML configuration file (environment and flags override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database and apply domain, table and procedure scripts
    BuildDb {
        /// Database file to create (".fdb" is appended when missing)
        #[arg(long)]
        db_dir: String,

        /// Root directory holding domains/, tables/ and procedures/
        #[arg(long)]
        scripts_dir: PathBuf,
    },

    /// Export domains, tables and procedures of a database to script files
    ExportScripts {
        /// Connection string (falls back to CONNECTION_STRING)
        #[arg(long)]
        connection_string: Option<String>,

        /// Directory to write domains/, tables/ and procedures/ into
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Apply domain, table and procedure scripts to an existing database
    UpdateDb {
        /// Connection string (falls back to CONNECTION_STRING)
        #[arg(long)]
        connection_string: Option<String>,

        /// Root directory holding domains/, tables/ and procedures/
        #[arg(long)]
        scripts_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; everything else is bad usage
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE_ERROR,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), MetaError> {
    setup_logging(&cli.verbosity, &cli.log_format);

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(MetaError::Config(format!("invalid .env file: {}", e))),
    }

    let base = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = base.with_overrides(|key| std::env::var(key).ok())?;
    let orchestrator = Orchestrator::new(config);

    match cli.command {
        Commands::BuildDb {
            db_dir,
            scripts_dir,
        } => {
            let result = orchestrator.build_db(&db_dir, &scripts_dir)?;
            print_apply(&result, "Database built successfully.", cli.output_json)?;
        }

        Commands::ExportScripts {
            connection_string,
            output_dir,
        } => {
            let result = orchestrator.export_scripts(connection_string.as_deref(), &output_dir)?;
            print_export(&result, cli.output_json)?;
        }

        Commands::UpdateDb {
            connection_string,
            scripts_dir,
        } => {
            let result = orchestrator.update_db(connection_string.as_deref(), &scripts_dir)?;
            print_apply(&result, "Database updated successfully.", cli.output_json)?;
        }
    }

    Ok(())
}

fn print_apply(result: &ApplyResult, message: &str, json: bool) -> Result<(), MetaError> {
    if json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!("{}", message);
    for phase in &result.phases {
        if phase.missing {
            println!("  {}: directory not found, skipped", phase.category);
        } else {
            println!(
                "  {}: {} executed, {} blank",
                phase.category,
                phase.executed.len(),
                phase.skipped.len()
            );
        }
    }
    println!("  Duration: {:.2}s", result.duration_seconds);
    Ok(())
}

fn print_export(result: &ExportResult, json: bool) -> Result<(), MetaError> {
    if json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!("Scripts exported successfully.");
    println!("  Output: {}", result.output_dir.display());
    println!("  Domains: {}", result.domains);
    println!("  Tables: {}", result.tables);
    println!("  Procedures: {}", result.procedures);
    if !result.collisions.is_empty() {
        println!("  Overwritten by name collision: {}", result.collisions.join(", "));
    }
    println!("  Duration: {:.2}s", result.duration_seconds);
    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over `--verbosity`.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
