//! The push hook processor: the top-level dispatch decision for one webhook.

use std::sync::Arc;
use std::time::Duration;

use correlation::{
    classify, ClassifiedEventType, DeliveryId, HostingVariant, OriginToken, OwnerName,
    PushHeadEvent, Reindexer, RepositoryName,
};
use tracing::{debug, field, info, instrument, warn, Span};

use crate::{EventScheduler, HookEventKind, PayloadAdapter};

/// Default hold time before an event is offered to watchers.
pub const DEFAULT_EVENT_DELAY: Duration = Duration::from_secs(5);

/// What [`PushHookProcessor::process`] did with a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Empty, unparsable, or event-less payload.
    Ignored,
    /// The payload had no ref changes; a full re-scan was requested.
    Reindexed {
        owner: OwnerName,
        repository: RepositoryName,
    },
    /// A classified event was scheduled for delivery.
    Scheduled {
        kind: ClassifiedEventType,
        delivery_id: DeliveryId,
    },
}

/// Turns push webhooks into scheduled events or reindex requests.
pub struct PushHookProcessor {
    adapter: Arc<dyn PayloadAdapter>,
    reindexer: Arc<dyn Reindexer>,
    scheduler: Arc<dyn EventScheduler>,
    delay: Duration,
}

impl PushHookProcessor {
    pub fn new(
        adapter: Arc<dyn PayloadAdapter>,
        reindexer: Arc<dyn Reindexer>,
        scheduler: Arc<dyn EventScheduler>,
    ) -> Self {
        Self {
            adapter,
            reindexer,
            scheduler,
            delay: DEFAULT_EVENT_DELAY,
        }
    }

    /// Overrides the delivery delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Processes one webhook delivery. Never fails: anything that cannot be
    /// processed is logged and reported as [`ProcessOutcome::Ignored`].
    #[instrument(
        skip_all,
        fields(hook = %hook, variant = %variant, delivery_id = field::Empty)
    )]
    pub async fn process(
        &self,
        hook: HookEventKind,
        payload: Option<&str>,
        variant: HostingVariant,
        origin: Option<OriginToken>,
    ) -> ProcessOutcome {
        let delivery_id = DeliveryId::new_random();
        Span::current().record("delivery_id", field::display(delivery_id));

        let Some(payload) = payload.filter(|p| !p.trim().is_empty()) else {
            debug!("Ignoring hook with empty payload");
            return ProcessOutcome::Ignored;
        };

        let push = match self.adapter.parse(variant, payload) {
            Ok(Some(push)) => push,
            Ok(None) => {
                debug!("Ignoring hook without a push event");
                return ProcessOutcome::Ignored;
            }
            Err(error) => {
                warn!(%error, "Ignoring unparsable push payload");
                return ProcessOutcome::Ignored;
            }
        };

        let owner = push.repository.owner.clone();
        let repository = push.repository.name.clone();

        match classify(&push.changes) {
            None => {
                info!(
                    %owner,
                    %repository,
                    "Received hook without changes; reindexing repository"
                );
                self.reindexer.reindex(&owner, &repository).await;
                ProcessOutcome::Reindexed { owner, repository }
            }
            Some(kind) => {
                info!(
                    %owner,
                    %repository,
                    %kind,
                    changes = push.changes.len(),
                    delay_secs = self.delay.as_secs(),
                    "Scheduling push event"
                );
                let event = PushHeadEvent::new(kind, push, variant, origin, delivery_id);
                self.scheduler.schedule(event, self.delay);
                ProcessOutcome::Scheduled { kind, delivery_id }
            }
        }
    }
}
