use log::debug;
use tokio::sync::broadcast;

use crate::models::{ProductId, VoteResult};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteEvent {
    Submitted { product_id: ProductId },
    Succeeded { product_id: ProductId },
    Failed { product_id: ProductId, error: String },
    ResultsUpdated { results: Vec<VoteResult> },
}

impl VoteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            VoteEvent::Submitted { .. } => "vote:submitted",
            VoteEvent::Succeeded { .. } => "vote:success",
            VoteEvent::Failed { .. } => "vote:error",
            VoteEvent::ResultsUpdated { .. } => "results:updated",
        }
    }
}

// Per-engine notification channel. Every subscriber sees every event sent
// after it subscribed.
#[derive(Debug, Clone)]
pub struct EventChannel {
    sender: broadcast::Sender<VoteEvent>,
}

impl EventChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VoteEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: VoteEvent) {
        debug!("Emitting {}", event.name());
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}
