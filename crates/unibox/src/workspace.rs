use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::redirect::StreamRedirector;
use crate::refresh::Refresher;
use crate::store::ChannelStore;
use crate::viewers::ViewerCounter;

/// Everything the HTTP handlers share.
pub struct Workspace {
    store: Arc<ChannelStore>,
    viewers: ViewerCounter,
    refresher: Arc<Refresher>,
    redirector: StreamRedirector,
    catalog: CatalogConfig,
    public_url: Option<String>,
}

impl Workspace {
    pub fn new(
        store: Arc<ChannelStore>,
        viewers: ViewerCounter,
        refresher: Arc<Refresher>,
        catalog: CatalogConfig,
        public_url: Option<String>,
    ) -> Self {
        let redirector = StreamRedirector::new(store.clone(), viewers.clone());

        Self {
            store,
            viewers,
            refresher,
            redirector,
            catalog,
            public_url,
        }
    }

    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    pub fn viewers(&self) -> &ViewerCounter {
        &self.viewers
    }

    pub fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    pub fn redirector(&self) -> &StreamRedirector {
        &self.redirector
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    /// Base URL for links handed out to clients: the configured public URL, or one derived
    /// from the `Host` the client used.
    pub fn base_url(&self, host: Option<&str>) -> String {
        match (&self.public_url, host) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("http://{host}"),
            (None, None) => String::new(),
        }
    }
}
