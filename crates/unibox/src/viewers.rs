use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use papaya::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Approximates how many people are watching each channel.
///
/// There is no session tracking: a viewer counts as online for `decay` after requesting a
/// stream. Keys are channel indices of whatever snapshot was current at request time.
#[derive(Clone)]
pub struct ViewerCounter {
    counts: Arc<HashMap<usize, AtomicUsize>>,
    decay: Duration,
    token: CancellationToken,
}

impl ViewerCounter {
    pub fn new(decay: Duration, token: CancellationToken) -> Self {
        Self {
            counts: Arc::new(HashMap::new()),
            decay,
            token,
        }
    }

    /// Counts a new viewer and schedules their removal once the decay delay elapses.
    pub fn on_stream_start(&self, index: usize) {
        let count = self.increment(index);
        trace!(index, count, "Viewer joined");

        let counter = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = counter.token.cancelled() => {}
                _ = tokio::time::sleep(counter.decay) => {
                    let count = counter.decrement(index);
                    trace!(index, count, "Viewer expired");
                }
            }
        });
    }

    pub fn current_counts(&self) -> BTreeMap<usize, usize> {
        let counts = self.counts.pin();

        counts
            .iter()
            .map(|(index, count)| (*index, count.load(Ordering::Acquire)))
            .collect()
    }

    fn increment(&self, index: usize) -> usize {
        let counts = self.counts.pin();
        let count = counts.get_or_insert_with(index, || AtomicUsize::new(0));

        count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Never goes below zero.
    fn decrement(&self, index: usize) -> usize {
        let counts = self.counts.pin();
        let Some(count) = counts.get(&index) else {
            return 0;
        };

        match count.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1)) {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }
}
