//! Scheduler: the single-consumer play queue and its lifecycle gate.
//!
//! Any thread may enqueue, query or wait. Exactly one background worker at a
//! time pops from the queue and plays through the backend. All state lives
//! behind one mutex; a condvar wakes waiters whenever an event fires or the
//! worker retires.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use chirp_types::{QueueItem, QueuedPause};
use crossbeam_channel::Receiver;

use crate::backend::SoundBackend;
use crate::events::{EventBus, LifecycleEvent};
use crate::gate::{GateState, GateStatus};
use crate::playback_thread;
use crate::telemetry::{DriftSummary, PlaybackTelemetry};

pub(crate) struct Shared {
    state: Mutex<GateState>,
    pub(crate) changed: Condvar,
    pub(crate) backend: Box<dyn SoundBackend>,
    pub(crate) events: EventBus,
    telemetry: Mutex<PlaybackTelemetry>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raise an event: update the gate, notify subscribers, wake waiters.
    pub(crate) fn signal(&self, event: LifecycleEvent) {
        let mut state = self.lock();
        state.raise(event);
        self.events.publish(event);
        self.changed.notify_all();
    }

    pub(crate) fn record_telemetry(
        &self,
        nominal: Duration,
        actual: Duration,
        tolerance: Duration,
    ) {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(nominal, actual, tolerance);
    }

    pub(crate) fn take_telemetry(&self) -> DriftSummary {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take_summary()
    }

    /// Block until `event` fires after the moment `state` was observed.
    /// Returns false if `timeout` elapsed first.
    fn wait_past(
        &self,
        state: MutexGuard<'_, GateState>,
        event: LifecycleEvent,
        timeout: Option<Duration>,
    ) -> bool {
        let seen = state.count(event);
        match timeout {
            None => {
                let _state = self
                    .changed
                    .wait_while(state, |s| s.count(event) == seen)
                    .unwrap_or_else(PoisonError::into_inner);
                true
            }
            Some(timeout) => {
                let (_state, result) = self
                    .changed
                    .wait_timeout_while(state, timeout, |s| s.count(event) == seen)
                    .unwrap_or_else(PoisonError::into_inner);
                !result.timed_out()
            }
        }
    }
}

/// Spawn the worker unless one is running or playback is halted.
/// Must be called with the gate locked so two callers cannot both spawn.
fn ensure_started_locked(shared: &Arc<Shared>, state: &mut GateState) {
    if state.active || state.stopped {
        return;
    }
    state.active = true;
    let worker = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name("chirp-playback".to_string())
        .spawn(move || playback_thread::run(worker));
    if let Err(e) = spawned {
        state.active = false;
        log::error!(target: "audio::scheduler", "failed to spawn playback worker: {}", e);
    }
}

/// Shared handle to the playback scheduler. Clones refer to the same queue.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    pub fn new(backend: Box<dyn SoundBackend>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(GateState::default()),
                changed: Condvar::new(),
                backend,
                events: EventBus::new(),
                telemetry: Mutex::new(PlaybackTelemetry::new()),
            }),
        }
    }

    /// Append to the tail of the queue. Does not start the worker.
    pub fn enqueue(&self, item: impl Into<QueueItem>) {
        let mut state = self.shared.lock();
        state.queue.push_back(item.into());
    }

    /// Queue a pause between plays. Does not start the worker.
    pub fn enqueue_pause(&self, duration_ms: u32) {
        self.enqueue(QueuedPause { duration_ms });
    }

    /// Start draining unless already draining or halted.
    pub fn ensure_started(&self) {
        let mut state = self.shared.lock();
        ensure_started_locked(&self.shared, &mut state);
    }

    /// Halt at the next play boundary. The play currently sounding finishes.
    pub fn pause(&self) {
        let mut state = self.shared.lock();
        state.stopped = true;
        log::debug!(target: "audio::scheduler", "pause requested ({} queued)", state.queue.len());
    }

    pub fn resume(&self) {
        let mut state = self.shared.lock();
        state.stopped = false;
        ensure_started_locked(&self.shared, &mut state);
    }

    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().queue.is_empty()
    }

    /// Drop every queued entry without playing it. Returns how many were
    /// removed. A play already sounding is unaffected.
    pub fn clear(&self) -> usize {
        let mut state = self.shared.lock();
        let removed = state.queue.len();
        state.queue.clear();
        if removed > 0 {
            log::debug!(target: "audio::scheduler", "cleared {} queued item(s)", removed);
        }
        removed
    }

    pub fn status(&self) -> GateStatus {
        self.shared.lock().status()
    }

    /// Receive every lifecycle event from now on.
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        self.shared.events.subscribe()
    }

    /// Block until the next play starts. Returns at once if no play is
    /// queued (queued pauses never start). Waiting also lifts a pause and
    /// starts the worker.
    pub fn await_next_start(&self) {
        self.next_start(None);
    }

    /// As [`Scheduler::await_next_start`], giving up after `timeout`.
    /// Returns false on timeout.
    pub fn await_next_start_timeout(&self, timeout: Duration) -> bool {
        self.next_start(Some(timeout))
    }

    /// Block until the play currently sounding finishes. Returns at once if
    /// nothing is playing.
    pub fn await_current_finish(&self) {
        self.current_finish(None);
    }

    pub fn await_current_finish_timeout(&self, timeout: Duration) -> bool {
        self.current_finish(Some(timeout))
    }

    /// Block until the queue has been played out. Lifts a pause and starts
    /// the worker like [`Scheduler::await_next_start`]; returns at once if
    /// there is nothing queued and no worker running.
    pub fn await_all_finished(&self) {
        self.all_finished(None);
    }

    pub fn await_all_finished_timeout(&self, timeout: Duration) -> bool {
        self.all_finished(Some(timeout))
    }

    fn next_start(&self, timeout: Option<Duration>) -> bool {
        let mut state = self.shared.lock();
        state.stopped = false;
        if state.queue.is_empty() {
            return true;
        }
        ensure_started_locked(&self.shared, &mut state);
        if !state.has_queued_play() {
            return true;
        }
        self.shared.wait_past(state, LifecycleEvent::Starting, timeout)
    }

    fn current_finish(&self, timeout: Option<Duration>) -> bool {
        let state = self.shared.lock();
        if !state.playing {
            return true;
        }
        self.shared.wait_past(state, LifecycleEvent::Finished, timeout)
    }

    fn all_finished(&self, timeout: Option<Duration>) -> bool {
        let mut state = self.shared.lock();
        state.stopped = false;
        if state.queue.is_empty() && !state.active {
            return true;
        }
        if !state.queue.is_empty() {
            ensure_started_locked(&self.shared, &mut state);
        }
        self.shared.wait_past(state, LifecycleEvent::AllPlayed, timeout)
    }
}
