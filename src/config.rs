//! Process configuration: CLI flags with environment fallbacks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::stats::{
    CachedEventSource, EventSource, FileEventSource, HttpEventSource, DEFAULT_SOURCE_URL,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "chatstats")]
#[command(about = "Chat statistics API - per-website chat totals over a date range")]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// URL of the raw event feed (JSON array)
    #[arg(long, env = "STATS_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Read the raw event feed from a local JSON file instead of the URL
    #[arg(long, env = "STATS_SOURCE_FILE")]
    pub source_file: Option<PathBuf>,

    /// Timeout for one feed fetch, in seconds
    #[arg(long, env = "STATS_FETCH_TIMEOUT_SECS", default_value = "10")]
    pub fetch_timeout_secs: u64,

    /// Reuse a fetched feed for this many seconds (0 = fetch per request)
    #[arg(long, env = "STATS_CACHE_TTL_SECS", default_value = "0")]
    pub cache_ttl_secs: u64,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the configured event source, wrapped in a cache when a TTL is set.
    pub fn build_source(&self) -> Result<Arc<dyn EventSource>> {
        let ttl = Duration::from_secs(self.cache_ttl_secs);

        match &self.source_file {
            Some(path) => Ok(with_cache(FileEventSource::new(path), ttl)),
            None => {
                let http = HttpEventSource::new(
                    self.source_url.clone(),
                    Duration::from_secs(self.fetch_timeout_secs),
                )?;
                Ok(with_cache(http, ttl))
            }
        }
    }

    pub fn source_description(&self) -> String {
        match &self.source_file {
            Some(path) => format!("file {}", path.display()),
            None => self.source_url.clone(),
        }
    }
}

fn with_cache<S: EventSource + 'static>(source: S, ttl: Duration) -> Arc<dyn EventSource> {
    if ttl.is_zero() {
        Arc::new(source)
    } else {
        Arc::new(CachedEventSource::new(source, ttl))
    }
}
