//! cloud-query - command line client for an EC2-style signed query API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloud_query::commands::{InvokeCommand, RegionsCommand, SignCommand};
use cloud_query::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cloud-query",
    version,
    about = "Signed query API client",
    long_about = "Calls an EC2-style query API with HMAC-SHA256 signed requests and prints normalized responses."
)]
struct Cli {
    /// API endpoint URL
    #[arg(long, global = true, env = "CLOUD_QUERY_ENDPOINT")]
    endpoint: Option<String>,

    /// Access key id
    #[arg(long, global = true, env = "CLOUD_QUERY_ACCESS_KEY")]
    access_key: Option<String>,

    /// Secret key used for signing
    #[arg(long, global = true, env = "CLOUD_QUERY_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Refuse actions other than Get*, List* and Describe*
    #[arg(long, global = true)]
    read_only: bool,

    /// Request timeout in seconds (0 = default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "CLOUD_QUERY_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log every normalized response (implies --verbose)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call an action and print its payload
    #[command(alias = "i")]
    Invoke {
        /// Action name, e.g. DescribeInstances
        action: String,

        /// Parameters as KEY=VALUE
        params: Vec<String>,
    },

    /// List the account's regions
    Regions,

    /// Show the string-to-sign and signature for a raw query string
    Sign {
        /// Unsigned query, e.g. "Action=DescribeRegions&Version=2009-08-15"
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose || cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(access_key) = cli.access_key {
        config.credentials.access_key = access_key;
    }
    if let Some(secret_key) = cli.secret_key {
        config.credentials.secret_key = secret_key;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    config.read_only |= cli.read_only;
    config.debug |= cli.debug;

    let output = match cli.command {
        Commands::Invoke { action, params } => {
            InvokeCommand::new(config).execute(&action, &params).await?
        }
        Commands::Regions => RegionsCommand::new(config).execute().await?,
        Commands::Sign { query } => SignCommand::new(config).execute(&query)?,
    };

    println!("{}", output);

    Ok(())
}
