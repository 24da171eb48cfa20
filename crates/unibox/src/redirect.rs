use std::sync::Arc;

use crate::channel::Target;
use crate::store::ChannelStore;
use crate::viewers::ViewerCounter;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("channel not found")]
    NotFound,

    #[error("channel {name} has no stream assigned yet")]
    NotReady { name: String },
}

/// Maps `/stream/<index>` requests to the channel's upstream URL.
pub struct StreamRedirector {
    store: Arc<ChannelStore>,
    viewers: ViewerCounter,
}

impl StreamRedirector {
    pub fn new(store: Arc<ChannelStore>, viewers: ViewerCounter) -> Self {
        Self { store, viewers }
    }

    /// Looks up the channel at `index` in the current snapshot and, when it has a stream,
    /// counts the viewer and returns the URL to redirect to.
    pub fn resolve(&self, index: usize) -> Result<String, ResolveError> {
        let snapshot = self.store.snapshot();
        let channel = snapshot.get(index).ok_or(ResolveError::NotFound)?;

        let Target::Url(url) = &channel.target else {
            return Err(ResolveError::NotReady {
                name: channel.name.clone(),
            });
        };

        self.viewers.on_stream_start(index);

        Ok(url.clone())
    }
}
