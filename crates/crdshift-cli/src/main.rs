//! Crdshift CLI - remap captured CRDs so backups restore against a compatible API version

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod documents;
mod error;
mod exit_codes;
mod host;

use documents::Format;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "CRDSHIFT_LOG";

#[derive(Parser)]
#[command(name = "crdshift")]
#[command(author = "Crdshift Contributors")]
#[command(version)]
#[command(about = "Remap captured CRDs to the API version they can be restored with", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run backup item actions over captured manifests and write the result
    Remap {
        /// Manifest file (YAML or JSON), or '-' for stdin
        input: PathBuf,

        /// Output file (if not set, outputs to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, env = "CRDSHIFT_FORMAT", default_value = "yaml")]
        format: Format,
    },

    /// Report which CRDs would be remapped, without rewriting anything
    Check {
        /// Manifest file (YAML or JSON), or '-' for stdin
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::try_parse().unwrap_or_else(|e| {
        // --help and --version are not errors
        if !e.use_stderr() {
            e.exit();
        }
        let _ = e.print();
        std::process::exit(exit_codes::USAGE_ERROR);
    });

    init_logging(cli.debug);

    let result = match cli.command {
        Commands::Remap {
            input,
            output,
            format,
        } => commands::remap::run(&input, output.as_deref(), format),

        Commands::Check { input, json } => commands::check::run(&input, json),
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
