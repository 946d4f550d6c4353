//! Cache refresh trigger
//!
//! The dashboard never writes datasets itself. A refresh asks the external
//! refresh job, over its webhook, to repopulate the cache and waits for the
//! job to answer. Only one refresh is in flight at a time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::core::config::RefreshConfig;

const USER_AGENT: &str = concat!("t5g-dashboard/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("No refresh hook configured")]
    Disabled,

    #[error("Refresh request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Refresh hook answered HTTP {0}")]
    Status(u16),
}

/// Something that can repopulate the cache
#[async_trait]
pub trait RefreshHook: Send + Sync {
    async fn trigger(&self, targets: &[String]) -> Result<(), RefreshError>;

    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    targets: &'a [String],
}

/// POSTs `{"targets": [...]}` to the refresh job's webhook
pub struct WebhookRefresh {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl WebhookRefresh {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            token,
        })
    }
}

#[async_trait]
impl RefreshHook for WebhookRefresh {
    async fn trigger(&self, targets: &[String]) -> Result<(), RefreshError> {
        let mut request = self.client.post(&self.url).json(&RefreshRequest { targets });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Used when no webhook is configured
pub struct DisabledRefresh;

#[async_trait]
impl RefreshHook for DisabledRefresh {
    async fn trigger(&self, _targets: &[String]) -> Result<(), RefreshError> {
        Err(RefreshError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Serializes refreshes and forwards them to the configured hook
pub struct RefreshService {
    hook: Arc<dyn RefreshHook>,
    targets: Vec<String>,
    in_flight: Mutex<()>,
}

impl RefreshService {
    pub fn new(hook: Arc<dyn RefreshHook>, targets: Vec<String>) -> Self {
        Self {
            hook,
            targets,
            in_flight: Mutex::new(()),
        }
    }

    pub fn from_config(config: &RefreshConfig) -> Result<Self, RefreshError> {
        let hook: Arc<dyn RefreshHook> = match &config.url {
            Some(url) => Arc::new(WebhookRefresh::new(
                url,
                config.token.clone(),
                Duration::from_secs(config.timeout_secs),
            )?),
            None => Arc::new(DisabledRefresh),
        };
        Ok(Self::new(hook, config.targets.clone()))
    }

    pub fn is_enabled(&self) -> bool {
        self.hook.is_enabled()
    }

    /// Run one refresh to completion. Concurrent callers queue behind it.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let _guard = self.in_flight.lock().await;
        let started = std::time::Instant::now();
        tracing::debug!(targets = ?self.targets, "Triggering cache refresh");

        self.hook.trigger(&self.targets).await?;

        tracing::info!(
            targets = ?self.targets,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cache refresh completed"
        );
        Ok(())
    }
}
