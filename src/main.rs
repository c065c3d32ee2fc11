use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minicourse::config::Config;
use minicourse::courses::CourseServer;
use minicourse::error::{Error, MinicourseErrorTrait};
use minicourse::status::{format_result, StatusChecker};
use minicourse::utils::normalize_targets;

#[derive(Parser)]
#[command(
    name = "minicourse",
    version,
    about = "In-memory course API and concurrent HTTP status checker",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the course CRUD API server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,

        /// Start with an empty store instead of the demo records
        #[arg(long, default_value = "false")]
        no_demo_data: bool,

        /// Disable permissive CORS headers
        #[arg(long, default_value = "false")]
        no_cors: bool,
    },

    /// Fetch the HTTP status code of every URL concurrently
    Check {
        /// URLs to check (defaults to the configured target list)
        urls: Vec<String>,

        /// Maximum number of checks in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Retries for transient transport failures
        #[arg(short, long)]
        retries: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Serve {
            bind,
            no_demo_data,
            no_cors,
        } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind
                    .parse()
                    .with_context(|| format!("Invalid bind address: {bind}"))?;
            }
            if no_demo_data {
                config.server.seed_demo_data = false;
            }
            if no_cors {
                config.server.enable_cors = false;
            }
            config.validate()?;

            tracing::info!(
                bind = %config.server.bind_address,
                demo_data = config.server.seed_demo_data,
                "Starting serve command"
            );
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check {
            urls,
            concurrency,
            timeout,
            retries,
        } => {
            if !urls.is_empty() {
                config.checker.targets = urls;
            }
            if let Some(limit) = concurrency {
                config.checker.max_concurrency = Some(limit);
            }
            if let Some(timeout) = timeout {
                config.checker.request_timeout_secs = timeout;
            }
            if let Some(retries) = retries {
                config.checker.max_retries = retries;
            }
            config.validate()?;

            tracing::info!(
                targets = config.checker.targets.len(),
                max_concurrency = ?config.checker.max_concurrency,
                max_retries = config.checker.max_retries,
                "Starting check command"
            );
            check(config).await
        }
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("minicourse=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("minicourse={level},tower_http={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let server = CourseServer::new(config.server).map_err(|e| report_failure(e.into()))?;

    println!("{}", server.info().display());
    println!();

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| report_failure(e.into()))?;
    Ok(())
}

async fn check(config: Config) -> Result<ExitCode> {
    let urls = normalize_targets(&config.checker.targets);

    let checker = StatusChecker::new(&config.checker).map_err(report_failure)?;
    let report = checker
        .check_with(urls, |result| println!("{}", format_result(result)))
        .await;

    tracing::info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        elapsed_ms = report.elapsed.as_millis(),
        "Check completed"
    );

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn report_failure(err: Error) -> anyhow::Error {
    tracing::error!(
        category = err.category().label(),
        recoverable = err.is_recoverable(),
        error = %err,
        "Command failed"
    );
    err.into()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
