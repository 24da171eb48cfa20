use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use super::Source;

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("Invalid user agent")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Building HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn fetch(&self) -> anyhow::Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Fetching playlist")?
            .error_for_status()
            .context("Fetching playlist")?;

        debug!(status = %response.status(), url = %self.url, "Fetched playlist");

        response.text().await.context("Decoding playlist")
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
