mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use commands::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wireup")]
#[command(about = "Inspect service layer configuration and discovery resources")]
struct Cli {
    /// Log level used when WIREUP_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the service layer and print a report
    Check {
        /// Directory resources are read from
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Base path of resource files below the root
        #[arg(long)]
        base_path: Option<String>,

        /// Fail on configuration errors
        #[arg(long)]
        strict: bool,

        /// Report format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ReportFormat,
    },

    /// List the types a discovery resource names
    Discover {
        /// Resource name, relative to the base path
        resource: String,

        /// Directory resources are read from
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Base path of resource files below the root
        #[arg(long)]
        base_path: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Yaml,
    Json,
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_env("WIREUP_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Check {
            root,
            base_path,
            strict,
            format,
        } => {
            let clean = check::run(&root, base_path.as_deref(), strict, format)?;
            if !clean {
                std::process::exit(1);
            }
        }
        Commands::Discover {
            resource,
            root,
            base_path,
            json,
        } => {
            discover::run(&root, base_path.as_deref(), &resource, json)?;
        }
    }

    Ok(())
}
