//! Raw-event sources.
//!
//! The aggregator never performs I/O itself; it is handed an [`EventSource`]
//! and calls it once per request.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Public snapshot of the chat-statistics feed.
pub const DEFAULT_SOURCE_URL: &str = "https://bitbucket.org/!api/2.0/snippets/tawkto/aA8zqE/4f62624a75da6d1b8dd7f70e53af8d36a1603910/files/webstats.json";

/// Capability returning the raw JSON payload of the event feed.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Value>;
}

/// Fetches the feed over HTTP(S).
#[derive(Clone)]
pub struct HttpEventSource {
    client: Client,
    url: String,
}

impl HttpEventSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_events(&self) -> Result<Value> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("HTTP error! status: {}", resp.status()));
        }

        resp.json::<Value>()
            .await
            .context("Failed to parse event feed as JSON")
    }
}

/// Reads the feed from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl EventSource for FileEventSource {
    async fn fetch_events(&self) -> Result<Value> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {} as JSON", self.path.display()))
    }
}

/// Keeps the last successful payload for `ttl`. Failures are never cached.
pub struct CachedEventSource<S> {
    inner: S,
    ttl: Duration,
    cached: RwLock<Option<(Instant, Value)>>,
}

impl<S: EventSource> CachedEventSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }

    fn fresh(&self) -> Option<Value> {
        let guard = self.cached.read();
        match guard.as_ref() {
            Some((fetched_at, payload)) if fetched_at.elapsed() < self.ttl => {
                Some(payload.clone())
            }
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl<S: EventSource> EventSource for CachedEventSource<S> {
    async fn fetch_events(&self) -> Result<Value> {
        if let Some(payload) = self.fresh() {
            debug!("Serving event feed from cache");
            return Ok(payload);
        }

        let payload = self.inner.fetch_events().await?;
        *self.cached.write() = Some((Instant::now(), payload.clone()));
        Ok(payload)
    }
}
