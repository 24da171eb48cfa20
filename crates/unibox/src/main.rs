mod channel;
mod config;
mod page;
mod redirect;
mod refresh;
mod server;
mod source;
mod store;
mod viewers;
mod workspace;

use std::path::PathBuf;
use std::sync::Arc;

use bpaf::Bpaf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::config::Config;
use crate::refresh::Refresher;
use crate::server::serve;
use crate::store::ChannelStore;
use crate::viewers::ViewerCounter;
use crate::workspace::Workspace;

#[derive(Bpaf, Clone, Debug)]
#[bpaf(options)]
struct Options {
    /// Perform verbose logging
    #[bpaf(short, long)]
    verbose: bool,

    /// Path to the config file
    #[bpaf(short, long, argument("PATH"), fallback(PathBuf::from("./config.toml")))]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = options().run();
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::builder()
        .with_default_directive(
            match options.verbose {
                true => LevelFilter::TRACE,
                _ => LevelFilter::INFO,
            }
            .into(),
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let mut config = Config::load_or_default(&options.config)?;
    config.apply_env()?;

    let token = CancellationToken::new();
    spawn_shutdown_watcher(token.clone());

    let store = Arc::new(ChannelStore::default());
    let viewers = ViewerCounter::new(config.viewers.decay(), token.clone());
    let source = source::from_config(&config.source, config.refresh.timeout())?;
    let refresher = Arc::new(Refresher::new(
        source,
        store.clone(),
        config.refresh.placeholders.clone(),
        config.refresh.timeout(),
    ));

    info!(
        interval = ?config.refresh.interval(),
        "Refreshing channels periodically"
    );
    tokio::spawn(
        refresher
            .clone()
            .run(config.refresh.interval(), token.clone()),
    );

    let state = Arc::new(Workspace::new(
        store,
        viewers,
        refresher,
        config.catalog,
        config.server.public_url,
    ));

    serve(config.server.address, state, token).await
}

fn spawn_shutdown_watcher(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Caught CTRL+C signal, shutting down");
        token.cancel();
    });
}
