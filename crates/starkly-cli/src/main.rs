mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "starkly",
    version,
    about = "Consolidate Stark accessibility-audit HTML exports into unique issues"
)]
struct Cli {
    /// Log extraction details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract raw issues from one or more HTML exports (without consolidating)
    Parse {
        /// Path(s) to exported HTML reports
        #[arg(required = true)]
        input_files: Vec<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// JSON file with parse/consolidate tunables
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Merge issues from one or more HTML exports into unique issue records
    Consolidate {
        /// Path(s) to exported HTML reports
        #[arg(required = true)]
        input_files: Vec<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write consolidated output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// JSON file with parse/consolidate tunables
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Severity wording: axe, hml or auto (default: inferred from the exports)
        #[arg(long, default_value = "auto")]
        scheme: String,
    },
    /// List issue categories in match priority order
    Categories,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("starkly=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("starkly=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_files,
            output,
            out,
            config,
        } => commands::parse::run(&input_files, &output, out, config),
        Commands::Consolidate {
            input_files,
            output,
            out,
            config,
            scheme,
        } => commands::consolidate::run(&input_files, &output, out, config, &scheme),
        Commands::Categories => commands::categories::list(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
