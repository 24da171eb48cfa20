use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::info;

const DEFAULT_PLAYLIST_URL: &str =
    "https://raw.githubusercontent.com/Eletrovision373iptv/minha-lista2/refs/heads/main/lista_record.m3u";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: SocketAddr,

    /// Base URL used in exported playlists. Falls back to the request's `Host` header.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            public_url: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Http {
        url: String,

        #[serde(default = "default_user_agent")]
        user_agent: String,
    },
    File {
        path: PathBuf,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Http {
            url: DEFAULT_PLAYLIST_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    pub timeout_secs: u64,

    /// Channel names installed when the very first refreshes fail.
    pub placeholders: Vec<String>,
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5 * 60,
            timeout_secs: 15,
            placeholders: [
                "Record SP",
                "Record Rio",
                "Record Minas",
                "Record RS",
                "Record Brasília",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewersConfig {
    pub decay_secs: u64,
}

impl ViewersConfig {
    pub fn decay(&self) -> Duration {
        Duration::from_secs(self.decay_secs)
    }
}

impl Default for ViewersConfig {
    fn default() -> Self {
        Self { decay_secs: 5 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub title: String,
    pub logo_url: Option<String>,
    pub group_title: Option<String>,
    pub download_filename: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            title: "UNIBOX RECORD PLUS".to_string(),
            logo_url: Some(
                "https://upload.wikimedia.org/wikipedia/pt/1/10/Logotipo_da_Record.png".to_string(),
            ),
            group_title: Some("Record TV".to_string()),
            download_filename: "record_tv.m3u".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub viewers: ViewersConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config from {}", path.display()))?;
        let config = toml::from_str::<Self>(&file)
            .with_context(|| format!("Parsing config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh.interval_secs == 0 {
            bail!("refresh.interval_secs must be at least 1");
        }

        if self.refresh.timeout_secs == 0 {
            bail!("refresh.timeout_secs must be at least 1");
        }

        Ok(())
    }

    /// Loads the config file if it exists, otherwise starts from the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(path)
    }

    /// Applies the `PORT` environment variable on top of the configured address.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            let port = port
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT: {port}"))?;

            self.server.address.set_port(port);
        }

        Ok(())
    }
}
