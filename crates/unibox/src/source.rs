mod file;
mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::SourceConfig;

/// Somewhere a playlist document can be read from.
#[async_trait]
pub trait Source: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<String>;

    fn describe(&self) -> String;
}

pub fn from_config(config: &SourceConfig, timeout: Duration) -> anyhow::Result<Arc<dyn Source>> {
    let source: Arc<dyn Source> = match config {
        SourceConfig::Http { url, user_agent } => {
            Arc::new(http::HttpSource::new(url, user_agent, timeout)?)
        }
        SourceConfig::File { path } => Arc::new(file::FileSource::new(path)),
    };

    Ok(source)
}
