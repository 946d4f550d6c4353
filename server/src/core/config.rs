use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_REFRESH_TARGETS, DEFAULT_REFRESH_TIMEOUT_SECS,
};

// =============================================================================
// Cache Backend Enum
// =============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendType {
    #[default]
    Memory,
    Redis,
}

impl fmt::Display for CacheBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackendType::Memory => write!(f, "memory"),
            CacheBackendType::Redis => write!(f, "redis"),
        }
    }
}

// =============================================================================
// File Config Structs (from JSON config file)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Redis cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RedisFileConfig {
    /// Connection URL for Redis-compatible backends
    pub url: Option<String>,
}

/// Memory cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MemoryCacheFileConfig {
    /// Maximum number of cache entries
    pub max_entries: Option<u64>,
}

/// Cache configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CacheFileConfig {
    pub backend: Option<CacheBackendType>,
    /// JSON object of `key -> value` loaded at startup
    pub seed_file: Option<String>,
    pub redis: Option<RedisFileConfig>,
    pub memory: Option<MemoryCacheFileConfig>,
}

/// Refresh hook configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RefreshFileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub targets: Option<Vec<String>>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub cache: Option<CacheFileConfig>,
    pub refresh: Option<RefreshFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        // Cache (with nested redis and memory)
        if let Some(cache) = other.cache {
            let current = self.cache.get_or_insert_with(CacheFileConfig::default);
            if cache.backend.is_some() {
                tracing::trace!(backend = ?cache.backend, "Merging cache.backend");
                current.backend = cache.backend;
            }
            if cache.seed_file.is_some() {
                tracing::trace!(seed_file = ?cache.seed_file, "Merging cache.seed_file");
                current.seed_file = cache.seed_file;
            }
            if let Some(redis) = cache.redis {
                let current_redis = current.redis.get_or_insert_with(RedisFileConfig::default);
                if redis.url.is_some() {
                    tracing::trace!("Merging cache.redis.url");
                    current_redis.url = redis.url;
                }
            }
            if let Some(memory) = cache.memory {
                let current_memory = current
                    .memory
                    .get_or_insert_with(MemoryCacheFileConfig::default);
                if memory.max_entries.is_some() {
                    tracing::trace!(
                        max_entries = ?memory.max_entries,
                        "Merging cache.memory.max_entries"
                    );
                    current_memory.max_entries = memory.max_entries;
                }
            }
        }

        // Refresh hook
        if let Some(refresh) = other.refresh {
            let current = self.refresh.get_or_insert_with(RefreshFileConfig::default);
            if refresh.url.is_some() {
                tracing::trace!(url = ?refresh.url, "Merging refresh.url");
                current.url = refresh.url;
            }
            if refresh.token.is_some() {
                tracing::trace!("Merging refresh.token");
                current.token = refresh.token;
            }
            if refresh.timeout_secs.is_some() {
                tracing::trace!(
                    timeout_secs = ?refresh.timeout_secs,
                    "Merging refresh.timeout_secs"
                );
                current.timeout_secs = refresh.timeout_secs;
            }
            if refresh.targets.is_some() {
                tracing::trace!(targets = ?refresh.targets, "Merging refresh.targets");
                current.targets = refresh.targets;
            }
        }

        if other.debug.is_some() {
            tracing::trace!(debug = ?other.debug, "Merging debug");
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Cache configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache backend type
    pub backend: CacheBackendType,
    /// Maximum entries (memory backend)
    pub max_entries: u64,
    /// Redis URL (redis backend)
    pub redis_url: Option<String>,
    /// Seed file loaded into the cache at startup
    pub seed_file: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendType::default(),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            redis_url: None,
            seed_file: None,
        }
    }
}

/// Refresh hook configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Webhook URL; refresh is disabled when unset
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Datasets the refresh job should rebuild
    pub targets: Vec<String>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub refresh: RefreshConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.t5g-dashboard/t5g-dashboard.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let mut file_config = FileConfig::default();
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            tracing::debug!(path = %profile_path.display(), "Profile config loaded");
        }
        Self::load_with(file_config, cli)
    }

    /// Layer the local/CLI config file and CLI values over `file_config`
    fn load_with(mut file_config: FileConfig, cli: &CliConfig) -> Result<Self> {
        tracing::trace!(cli = ?cli, "CLI config");

        // Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            tracing::debug!(path = %path.display(), "Config file loaded");
        }

        let file_server = file_config.server.unwrap_or_default();
        let file_cache = file_config.cache.unwrap_or_default();
        let file_redis = file_cache.redis.unwrap_or_default();
        let file_memory = file_cache.memory.unwrap_or_default();
        let file_refresh = file_config.refresh.unwrap_or_default();

        // Layer configs: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let cache = CacheConfig {
            backend: cli
                .cache_backend
                .or(file_cache.backend)
                .unwrap_or_default(),
            max_entries: cli
                .cache_max_entries
                .or(file_memory.max_entries)
                .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
            redis_url: cli.cache_redis_url.clone().or(file_redis.url),
            seed_file: cli
                .cache_seed_file
                .clone()
                .or_else(|| file_cache.seed_file.map(PathBuf::from))
                .map(|p| expand_path(&p.to_string_lossy())),
        };

        let refresh = RefreshConfig {
            url: cli.refresh_url.clone().or(file_refresh.url),
            token: cli.refresh_token.clone().or(file_refresh.token),
            timeout_secs: cli
                .refresh_timeout_secs
                .or(file_refresh.timeout_secs)
                .unwrap_or(DEFAULT_REFRESH_TIMEOUT_SECS),
            targets: file_refresh.targets.unwrap_or_else(|| {
                DEFAULT_REFRESH_TARGETS
                    .iter()
                    .map(|t| t.to_string())
                    .collect()
            }),
        };

        // --debug flag wins; otherwise the file decides
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        let config = Self {
            server: ServerConfig { host, port },
            cache,
            refresh,
            debug,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            debug = config.debug,
            cache_backend = %config.cache.backend,
            cache_max_entries = config.cache.max_entries,
            cache_seed_file = ?config.cache.seed_file,
            refresh_enabled = config.refresh.url.is_some(),
            refresh_timeout_secs = config.refresh.timeout_secs,
            refresh_targets = ?config.refresh.targets,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port nobody can find
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.cache.backend == CacheBackendType::Redis && self.cache.redis_url.is_none() {
            anyhow::bail!(
                "Configuration error: cache.redis.url is required when cache.backend is 'redis'"
            );
        }

        if self.refresh.timeout_secs == 0 {
            anyhow::bail!("Configuration error: refresh.timeout_secs must be greater than 0");
        }

        if let Some(ref url) = self.refresh.url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            anyhow::bail!(
                "Configuration error: refresh.url must start with http:// or https://. Got: {}",
                url
            );
        }

        if self.refresh.targets.is_empty() {
            anyhow::bail!("Configuration error: refresh.targets must not be empty");
        }

        // The dashboard has no authentication of its own
        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Dashboard is listening on all interfaces without authentication"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.t5g-dashboard/t5g-dashboard.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
