use std::path::PathBuf;

use clap::Parser;

use devobs_core::error::{ApiError, DevObsError};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "devobs",
    version,
    about = "Inspect and manage what the dev-observer backend tracks"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a config file (default: $DEVOBS_CONFIG, then .devobs/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true, env = "DEVOBS_BASE_URL")]
    pub base_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

/// Classify an error into a process exit code.
///
///   0 success
///   1 general/unknown error
///   2 configuration error
///   3 entity not found
///   4 invalid input
///   5 backend API or network error
///   6 authorization error
fn classify_exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<DevObsError>() {
            return match e {
                DevObsError::Api(api) => classify_api(api),
                DevObsError::Validation(_) => 4,
                DevObsError::Config(_) => 2,
                DevObsError::Store(_) => 1,
            };
        }
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            return classify_api(api);
        }
        if cause.is::<devobs_core::error::ConfigError>() {
            return 2;
        }
        if cause.is::<devobs_core::error::ValidationError>() {
            return 4;
        }
    }

    let lower = format!("{err:#}").to_lowercase();
    if lower.contains("not found") {
        3
    } else if lower.contains("config") {
        2
    } else if lower.contains("invalid") {
        4
    } else {
        1
    }
}

fn classify_api(err: &ApiError) -> i32 {
    match err {
        ApiError::Auth(_) | ApiError::Status { status: 401 | 403, .. } => 6,
        ApiError::Status { status: 404, .. } => 3,
        ApiError::Status { .. } | ApiError::Network(_) | ApiError::Parse(_) => 5,
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match (cli.global.quiet, cli.global.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create runtime: {e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(commands::run(cli.command, cli.global)) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(classify_exit_code(&e));
        }
    }
}
