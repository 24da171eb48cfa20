use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::channel::Channel;
use crate::source::Source;
use crate::store::ChannelStore;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("failed to fetch the playlist: {0:#}")]
    Fetch(anyhow::Error),

    #[error("the playlist contains no channels")]
    EmptyPlaylist,
}

/// Pulls the playlist from its source and swaps it into the store.
pub struct Refresher {
    source: Arc<dyn Source>,
    store: Arc<ChannelStore>,
    placeholders: Vec<String>,
    timeout: Duration,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn Source>,
        store: Arc<ChannelStore>,
        placeholders: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            store,
            placeholders,
            timeout,
        }
    }

    /// Runs one fetch, parse and swap cycle and returns the number of channels installed.
    ///
    /// On failure the current snapshot is kept as is, unless the store has never held any
    /// channel, in which case the placeholders are installed so the catalog is never empty.
    pub async fn refresh(&self) -> Result<usize, RefreshError> {
        info!(source = %self.source.describe(), "Refreshing channels");

        let result = self.fetch_channels().await.and_then(|channels| {
            let names = channels
                .iter()
                .map(|channel| channel.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let count = channels.len();

            match self.store.replace(channels, Utc::now()) {
                true => Ok((count, names)),
                _ => Err(RefreshError::EmptyPlaylist),
            }
        });

        match result {
            Ok((count, names)) => {
                info!(count, channels = %names, "Channels refreshed");
                Ok(count)
            }
            Err(err) => {
                warn!(%err, "Failed to refresh channels");
                self.seed_placeholders();
                Err(err)
            }
        }
    }

    async fn fetch_channels(&self) -> Result<Vec<Channel>, RefreshError> {
        let text = tokio::time::timeout(self.timeout, self.source.fetch())
            .await
            .map_err(|_| {
                RefreshError::Fetch(anyhow::anyhow!("timed out after {:?}", self.timeout))
            })?
            .map_err(RefreshError::Fetch)?;

        Ok(unibox_m3u::parse(&text)
            .into_iter()
            .map(Channel::from)
            .collect())
    }

    fn seed_placeholders(&self) {
        let placeholders = self
            .placeholders
            .iter()
            .map(Channel::unconfigured)
            .collect();

        if self.store.seed(placeholders) {
            warn!(
                count = self.placeholders.len(),
                "Using placeholder channels until the playlist becomes available"
            );
        }
    }

    /// Refreshes immediately, then once per `interval` until `token` is cancelled.
    pub async fn run(self: Arc<Self>, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    // Failures are already logged; the next tick retries.
                    let _ = self.refresh().await;
                }
            }
        }

        info!("Stopped refreshing channels");
    }
}
