//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate, health), and their associated
//! argument structs. Process-level flags have environment variable
//! equivalents for container deployments; the listener, paths, and proxy
//! routes come from the layered config file and `STATIC_*` / `API_PROXY_*`
//! variables instead.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "edgeport",
    version,
    about = "Static frontend, reverse proxy and demo session edge",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        edgeport init                            Create a starter config\n  \
        edgeport run                             Start with /app/config/static-server.conf\n  \
        edgeport run -c ./static-server.conf     Start with a specific config"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the edge server
    Run(RunArgs),

    /// Generate a starter config file
    Init(InitArgs),

    /// Resolve and print the layered configuration without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        edgeport run                                       Default config path\n  \
        edgeport run -c edge.conf --pretty                 Local dev mode\n  \
        API_PROXY_ROUTES='/api,backend,8080' edgeport run  Override proxy routes")]
pub struct RunArgs {
    /// Config file path (overrides `STATIC_CONFIG_PATH`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Upstream timeout in milliseconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 10 * 1024 * 1024,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        edgeport init                          Write ./static-server.conf\n  \
        edgeport init -o /etc/edge.conf -f     Overwrite an existing file")]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "static-server.conf")]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to resolve (overrides `STATIC_CONFIG_PATH`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,

    /// Exit with an error when any warning is reported
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:80")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
