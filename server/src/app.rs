//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{CacheService, CachedDashboardSource, DashboardSource, RefreshService};
use crate::domain::StatsReshaper;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub cache: Arc<CacheService>,
    pub source: Arc<dyn DashboardSource>,
    pub refresh: Arc<RefreshService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;
        match command {
            Some(Commands::Refresh) => app.refresh_once().await,
            Some(Commands::Stats { case_type }) => app.print_stats(&case_type).await,
            Some(Commands::Start) | None => Self::start_server(app).await,
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let cache = Arc::new(
            CacheService::new(&config.cache)
                .await
                .context("Failed to initialize cache service")?,
        );
        tracing::debug!(backend = cache.backend_name(), "Cache initialized");

        if let Some(seed_file) = &config.cache.seed_file {
            let keys = cache
                .seed_from_file(seed_file)
                .await
                .with_context(|| format!("Failed to seed cache from {}", seed_file.display()))?;
            tracing::info!(path = %seed_file.display(), keys, "Cache seeded");
        }

        let refresh = Arc::new(
            RefreshService::from_config(&config.refresh)
                .context("Failed to initialize refresh hook")?,
        );
        let source: Arc<dyn DashboardSource> = Arc::new(CachedDashboardSource::new(cache.clone()));

        if config.debug {
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                cache = %config.cache.backend,
                refresh_enabled = refresh.is_enabled(),
                "Debug mode enabled"
            );
        }

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            cache,
            source,
            refresh,
        })
    }

    async fn refresh_once(&self) -> Result<()> {
        self.refresh.refresh().await.context("Cache refresh failed")?;
        println!("Cache refreshed");
        Ok(())
    }

    async fn print_stats(&self, case_type: &str) -> Result<()> {
        let report = StatsReshaper::new(self.source.clone())
            .reshape(case_type)
            .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.cache.backend_name(),
            app.refresh.is_enabled(),
        );

        ApiServer::new(app).start().await?;
        tracing::debug!("Shutdown complete");

        Ok(())
    }
}
