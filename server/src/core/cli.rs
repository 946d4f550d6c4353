use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::CacheBackendType;
use super::constants::{
    ENV_CACHE_BACKEND, ENV_CACHE_MAX_ENTRIES, ENV_CACHE_REDIS_URL, ENV_CACHE_SEED_FILE,
    ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_PORT, ENV_REFRESH_TIMEOUT_SECS, ENV_REFRESH_TOKEN,
    ENV_REFRESH_URL,
};

#[derive(Parser)]
#[command(name = "t5g-dashboard")]
#[command(version, about = "Telco 5G support case dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Cache options
    /// Cache backend (memory or redis)
    #[arg(long, global = true, env = ENV_CACHE_BACKEND, value_parser = parse_cache_backend_type)]
    pub cache_backend: Option<CacheBackendType>,

    /// Maximum number of cache entries
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<u64>,

    /// Redis-compatible cache URL shared with the refresh job.
    /// Formats: redis://host:port/db, rediss://host:port/db
    #[arg(long, global = true, env = ENV_CACHE_REDIS_URL)]
    pub cache_redis_url: Option<String>,

    /// JSON file of cache keys to load at startup
    #[arg(long, global = true, env = ENV_CACHE_SEED_FILE)]
    pub cache_seed_file: Option<PathBuf>,

    // Refresh hook options
    /// Webhook that asks the refresh job to repopulate the cache
    #[arg(long, global = true, env = ENV_REFRESH_URL)]
    pub refresh_url: Option<String>,

    /// Bearer token sent to the refresh webhook
    #[arg(long, global = true, env = ENV_REFRESH_TOKEN, hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Refresh webhook timeout in seconds
    #[arg(long, global = true, env = ENV_REFRESH_TIMEOUT_SECS)]
    pub refresh_timeout_secs: Option<u64>,
}

/// Parse cache backend type from CLI/env string
fn parse_cache_backend_type(s: &str) -> Result<CacheBackendType, String> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(CacheBackendType::Memory),
        "redis" => Ok(CacheBackendType::Redis),
        _ => Err(format!(
            "Invalid cache backend '{}'. Valid options: memory, redis",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Ask the refresh job to repopulate the cache, then exit
    Refresh,
    /// Print the reshaped stats history for a case type as JSON
    Stats {
        /// Case type (telco5g or cnv)
        case_type: String,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub cache_backend: Option<CacheBackendType>,
    pub cache_max_entries: Option<u64>,
    pub cache_redis_url: Option<String>,
    pub cache_seed_file: Option<PathBuf>,
    pub refresh_url: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_timeout_secs: Option<u64>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            config: cli.config,
            cache_backend: cli.cache_backend,
            cache_max_entries: cli.cache_max_entries,
            cache_redis_url: cli.cache_redis_url,
            cache_seed_file: cli.cache_seed_file,
            refresh_url: cli.refresh_url,
            refresh_token: cli.refresh_token,
            refresh_timeout_secs: cli.refresh_timeout_secs,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    split(Cli::parse())
}

fn split(mut cli: Cli) -> (CliConfig, Option<Commands>) {
    let command = cli.command.take();
    (cli.into(), command)
}
