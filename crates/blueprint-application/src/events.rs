//! Change notifications published by the flows.

use serde::Serialize;
use tokio::sync::mpsc;

use blueprint_core::artifact::ArtifactKind;
use blueprint_core::session::MessageRole;

/// Which of the two independent flows an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Consultation,
    Design,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    PhaseChanged { flow: FlowKind, phase: String },
    BusyChanged { flow: FlowKind, busy: bool },
    Progress { label: String },
    MessageAppended { flow: FlowKind, role: MessageRole, text: String },
    ArtifactUpdated { kind: ArtifactKind },
    Reset { flow: FlowKind },
}

/// Fan-out list of subscribers. Subscribers whose receiver was dropped are
/// pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<WizardEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sender: mpsc::UnboundedSender<WizardEvent>) {
        self.subscribers.push(sender);
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WizardEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.add(tx);
        rx
    }

    pub fn publish(&mut self, event: WizardEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let mut kept = bus.subscribe();
        let dropped = bus.subscribe();
        drop(dropped);

        bus.publish(WizardEvent::Progress {
            label: "x".into(),
        });

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(
            kept.try_recv().unwrap(),
            WizardEvent::Progress { label: "x".into() }
        );
    }
}
