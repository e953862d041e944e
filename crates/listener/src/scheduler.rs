//! Deferred delivery of classified events to the watcher pool.
//!
//! The hosting service is eventually consistent: reading its API the moment
//! a webhook arrives can observe the state before the push. Events are
//! therefore held for a delay before being offered to watchers. Once
//! scheduled, a delivery always runs; there is no cancellation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use correlation::{Clock, EventConsumer, PushHeadEvent, SystemClock, Watcher, WatcherRegistry};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info_span, trace, warn, Instrument};

/// Delay-then-invoke seam between the processor and delivery.
pub trait EventScheduler: Send + Sync {
    /// Offers `event` to the watcher pool after `delay`. Must be callable from
    /// concurrent webhook deliveries.
    fn schedule(&self, event: PushHeadEvent, delay: Duration);
}

/// Schedules deliveries as tokio tasks.
///
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    registry: Arc<dyn WatcherRegistry>,
    consumer: Arc<dyn EventConsumer>,
    clock: Arc<dyn Clock>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(registry: Arc<dyn WatcherRegistry>, consumer: Arc<dyn EventConsumer>) -> Self {
        Self::with_clock(registry, consumer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        registry: Arc<dyn WatcherRegistry>,
        consumer: Arc<dyn EventConsumer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            consumer,
            clock,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Waits until every delivery scheduled so far, including ones scheduled
    /// while waiting, has finished.
    pub async fn wait_idle(&self) {
        loop {
            let handles = std::mem::take(
                &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(error) = handle.await {
                    warn!(%error, "Event delivery task failed");
                }
            }
        }
    }
}

impl EventScheduler for TokioScheduler {
    fn schedule(&self, event: PushHeadEvent, delay: Duration) {
        let span = info_span!(
            "deliver_event",
            delivery_id = %event.delivery_id(),
            kind = %event.kind(),
            repository = %event.source_name(),
        );
        let registry = Arc::clone(&self.registry);
        let consumer = Arc::clone(&self.consumer);
        let clock = Arc::clone(&self.clock);

        let handle = tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                deliver(Arc::new(event), registry, consumer, clock).await;
            }
            .instrument(span),
        );

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}

/// Offers `event` to every registered watcher, each in its own task.
async fn deliver(
    event: Arc<PushHeadEvent>,
    registry: Arc<dyn WatcherRegistry>,
    consumer: Arc<dyn EventConsumer>,
    clock: Arc<dyn Clock>,
) {
    let watchers = registry.watchers().await;
    debug!(watchers = watchers.len(), "Offering event to watchers");

    let mut deliveries = JoinSet::new();
    for watcher in watchers {
        if !event.is_applicable(&watcher) {
            trace!(%watcher, "Watcher does not match event");
            continue;
        }
        debug!(%watcher, "Delivering event");
        let event = Arc::clone(&event);
        let consumer = Arc::clone(&consumer);
        let clock = Arc::clone(&clock);
        deliveries.spawn(
            async move {
                match &watcher {
                    Watcher::Navigator(navigator) => {
                        consumer.on_navigator_event(navigator, &event).await;
                    }
                    Watcher::Source(source) => {
                        let heads = event.heads(source, clock.as_ref());
                        consumer.on_source_heads(source, &event, heads).await;
                    }
                }
            }
            .in_current_span(),
        );
    }

    while let Some(result) = deliveries.join_next().await {
        if let Err(error) = result {
            warn!(%error, "Watcher delivery task failed");
        }
    }
}
