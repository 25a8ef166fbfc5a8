//! Best-effort dashboard fan-out.

use tokio::sync::broadcast;
use tracing::trace;
use vstitch_models::PlotMessage;

const DEFAULT_CAPACITY: usize = 64;

/// Broadcasts plot messages to any number of dashboard listeners.
///
/// Sending never blocks; with no listener the message is dropped, and a
/// slow listener skips ahead rather than holding up the pipeline.
#[derive(Debug, Clone)]
pub struct PlotPublisher {
    tx: broadcast::Sender<PlotMessage>,
}

impl Default for PlotPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PlotPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlotMessage> {
        self.tx.subscribe()
    }

    /// Returns the number of listeners the message reached.
    pub fn send(&self, message: PlotMessage) -> usize {
        let kind = message.kind();
        match self.tx.send(message) {
            Ok(n) => n,
            Err(_) => {
                trace!(kind, "No dashboard listeners");
                0
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
