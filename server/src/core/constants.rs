// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "T5G Dashboard";

/// Application name in lowercase (for log filters and identifiers)
pub const APP_NAME_LOWER: &str = "t5g_dashboard";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".t5g-dashboard";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "t5g-dashboard.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "T5G_DASHBOARD_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "T5G_DASHBOARD_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "T5G_DASHBOARD_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "T5G_DASHBOARD_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "T5G_DASHBOARD_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// Environment Variables - Cache
// =============================================================================

/// Environment variable for cache backend (memory or redis)
pub const ENV_CACHE_BACKEND: &str = "T5G_DASHBOARD_CACHE_BACKEND";

/// Environment variable for in-memory cache capacity
pub const ENV_CACHE_MAX_ENTRIES: &str = "T5G_DASHBOARD_CACHE_MAX_ENTRIES";

/// Environment variable for the Redis-compatible cache URL
pub const ENV_CACHE_REDIS_URL: &str = "T5G_DASHBOARD_CACHE_REDIS_URL";

/// Environment variable for the cache seed file
pub const ENV_CACHE_SEED_FILE: &str = "T5G_DASHBOARD_CACHE_SEED_FILE";

// =============================================================================
// Cache Defaults
// =============================================================================

/// Default in-memory cache capacity
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

// =============================================================================
// Environment Variables - Refresh Hook
// =============================================================================

/// Environment variable for the refresh webhook URL
pub const ENV_REFRESH_URL: &str = "T5G_DASHBOARD_REFRESH_URL";

/// Environment variable for the refresh webhook bearer token
pub const ENV_REFRESH_TOKEN: &str = "T5G_DASHBOARD_REFRESH_TOKEN";

/// Environment variable for the refresh webhook timeout
pub const ENV_REFRESH_TIMEOUT_SECS: &str = "T5G_DASHBOARD_REFRESH_TIMEOUT_SECS";

// =============================================================================
// Refresh Defaults
// =============================================================================

/// Default refresh webhook timeout. Card refreshes scrape the upstream
/// ticket system, so this is generous.
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 300;

/// Datasets requested from the refresh job when none are configured
pub const DEFAULT_REFRESH_TARGETS: &[&str] = &["cards"];

// =============================================================================
// Cache Keys
// =============================================================================

/// Key holding the last refresh timestamp
pub const CACHE_KEY_TIMESTAMP: &str = "timestamp";

/// Key holding the trending cards list
pub const CACHE_KEY_TRENDING: &str = "trending_cards";

/// Key holding the summary plot series
pub const CACHE_KEY_PLOTS: &str = "plots";
