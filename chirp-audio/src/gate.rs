use std::collections::VecDeque;

use chirp_types::QueueItem;

use crate::events::LifecycleEvent;

/// Snapshot of the lifecycle gate for status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateStatus {
    /// A playback worker is running.
    pub active: bool,
    /// A play (not a queued pause) is currently sounding.
    pub playing: bool,
    /// Draining is administratively paused.
    pub stopped: bool,
    pub queued: usize,
}

/// Everything the scheduler mutex guards: the queue, the three gate flags,
/// and one counter per lifecycle event so waiters can tell "a new event
/// fired" from "I saw the previous one".
#[derive(Debug, Default)]
pub(crate) struct GateState {
    pub(crate) queue: VecDeque<QueueItem>,
    pub(crate) active: bool,
    pub(crate) playing: bool,
    pub(crate) stopped: bool,
    started: u64,
    finished: u64,
    all_played: u64,
}

impl GateState {
    pub(crate) fn count(&self, event: LifecycleEvent) -> u64 {
        match event {
            LifecycleEvent::Starting => self.started,
            LifecycleEvent::Finished => self.finished,
            LifecycleEvent::AllPlayed => self.all_played,
        }
    }

    /// Record an event and apply its flag transition.
    pub(crate) fn raise(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Starting => {
                self.started += 1;
                self.playing = true;
            }
            LifecycleEvent::Finished => {
                self.finished += 1;
                self.playing = false;
            }
            LifecycleEvent::AllPlayed => {
                self.all_played += 1;
            }
        }
    }

    /// Whether any queued entry is a play rather than a queued pause.
    pub(crate) fn has_queued_play(&self) -> bool {
        self.queue.iter().any(|item| matches!(item, QueueItem::Play(_)))
    }

    pub(crate) fn status(&self) -> GateStatus {
        GateStatus {
            active: self.active,
            playing: self.playing,
            stopped: self.stopped,
            queued: self.queue.len(),
        }
    }
}
