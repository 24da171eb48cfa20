use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::channel::Channel;

#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub channels: Vec<Channel>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Holds the current channel list. The list is never edited in place: writers build a new
/// [`Snapshot`] and swap it in, so readers always see a complete one.
#[derive(Default)]
pub struct ChannelStore {
    current: RwLock<Arc<Snapshot>>,
}

impl ChannelStore {
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().unwrap().clone()
    }

    /// Installs a freshly fetched channel list. Empty lists are rejected and leave the store
    /// untouched; returns whether the swap happened.
    pub fn replace(&self, channels: Vec<Channel>, refreshed_at: DateTime<Utc>) -> bool {
        if channels.is_empty() {
            return false;
        }

        let snapshot = Arc::new(Snapshot {
            channels,
            refreshed_at: Some(refreshed_at),
        });

        *self.current.write().unwrap() = snapshot;
        true
    }

    /// Installs `channels` only if the store has never held any; the refresh time stays unset.
    pub fn seed(&self, channels: Vec<Channel>) -> bool {
        let mut current = self.current.write().unwrap();
        if !current.is_empty() || channels.is_empty() {
            return false;
        }

        *current = Arc::new(Snapshot {
            channels,
            refreshed_at: current.refreshed_at,
        });

        true
    }
}
