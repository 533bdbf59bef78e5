//! Lifecycle events raised by the playback worker.
//!
//! Blocking waits on the scheduler cover the common cases; subscribers get a
//! channel of every event for observers that must not block.

use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A play is about to sound its first segment.
    Starting,
    /// A play has finished its last segment.
    Finished,
    /// The queue ran dry without being halted.
    AllPlayed,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Starting => "starting",
            LifecycleEvent::Finished => "finished",
            LifecycleEvent::AllPlayed => "all-played",
        }
    }
}

/// Fan-out of lifecycle events to any number of subscribers.
#[derive(Default)]
pub(crate) struct EventBus {
    subscribers: Mutex<Vec<Sender<LifecycleEvent>>>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self) -> Receiver<LifecycleEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver to every live subscriber; dropped receivers are pruned.
    pub(crate) fn publish(&self, event: LifecycleEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        log::trace!(
            target: "audio::events",
            "{} -> {} subscriber(s)",
            event.name(),
            subscribers.len()
        );
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(event).is_ok());
        if subscribers.len() < before {
            log::debug!(
                target: "audio::events",
                "pruned {} closed subscriber(s)",
                before - subscribers.len()
            );
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_every_event() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(LifecycleEvent::Starting);
        bus.publish(LifecycleEvent::Finished);

        for rx in [a, b] {
            let seen: Vec<_> = rx.try_iter().collect();
            assert_eq!(seen, vec![LifecycleEvent::Starting, LifecycleEvent::Finished]);
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(LifecycleEvent::AllPlayed);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Ok(LifecycleEvent::AllPlayed));
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(LifecycleEvent::Starting);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
