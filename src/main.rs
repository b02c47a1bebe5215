use bakta_query::cli::{Cli, Commands};
use bakta_query::config::{resolve_config, Config};
use bakta_query::BaktaError;
use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Config errors are reported after logging is up
    let config = resolve_config(cli.config.as_deref());

    // -v/-vv win over BAKTA_QUERY_LOG, which wins over the config file; RUST_LOG overrides all
    let log_level = match cli.verbose {
        0 => std::env::var("BAKTA_QUERY_LOG").unwrap_or_else(|_| {
            config
                .as_ref()
                .map(|c| c.logging.level.clone())
                .unwrap_or_else(|_| "info".to_string())
        }),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = config
        .map_err(anyhow::Error::from)
        .and_then(|config| run(cli, config));

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<BaktaError>() {
            Some(BaktaError::Config(_)) => 2,
            Some(BaktaError::Io(_)) => 3,
            Some(BaktaError::Parse { .. })
            | Some(BaktaError::Transform { .. })
            | Some(BaktaError::UnsupportedFormat { .. }) => 4,
            Some(BaktaError::QueryFailed { .. }) | Some(BaktaError::InvalidQuery(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    tracing::debug!(threads = num_threads, "Configured thread pool");

    match cli.command {
        Commands::Formats(args) => bakta_query::cli::commands::formats::run(args),
        Commands::Parse(args) => bakta_query::cli::commands::parse::run(args),
        Commands::Query(args) => bakta_query::cli::commands::query::run(args, &config),
        Commands::Range(args) => bakta_query::cli::commands::range::run(args, &config),
        Commands::Summary(args) => bakta_query::cli::commands::summary::run(args, &config),
    }
}
