use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chirp_types::{Play, QueueItem, Segment, Tone};

use crate::backend::SoundBackend;
use crate::events::LifecycleEvent;
use crate::scheduler::Shared;

/// Lateness beyond this is counted as a late play in telemetry.
const LATE_TOLERANCE: Duration = Duration::from_millis(10);

/// Worker body: drain the queue until it is empty or halted.
pub(crate) fn run(shared: Arc<Shared>) {
    let _guard = UnwindGuard(&shared);
    log::debug!(target: "audio::scheduler", "playback worker started");

    while let Some(item) = next_item(&shared) {
        match item {
            QueueItem::Pause(pause) => thread::sleep(pause.duration()),
            QueueItem::Play(play) => play_through(&shared, &play),
        }
    }
}

/// Pop the next queue entry, or retire the worker. The halt check happens
/// here, so a pause only takes effect between plays.
fn next_item(shared: &Shared) -> Option<QueueItem> {
    let mut state = shared.lock();
    if state.stopped {
        state.active = false;
        shared.changed.notify_all();
        log::debug!(
            target: "audio::scheduler",
            "playback halted with {} item(s) queued",
            state.queue.len()
        );
        return None;
    }

    if let Some(item) = state.queue.pop_front() {
        return Some(item);
    }

    state.raise(LifecycleEvent::AllPlayed);
    state.active = false;
    shared.events.publish(LifecycleEvent::AllPlayed);
    shared.changed.notify_all();
    drop(state);

    let summary = shared.take_telemetry();
    if summary.samples > 0 {
        log::debug!(
            target: "audio::scheduler",
            "queue drained: {} play(s), drift avg {}us max {}us p95 {}us, {} late overall",
            summary.samples,
            summary.avg_drift_us,
            summary.max_drift_us,
            summary.p95_drift_us,
            summary.late_plays
        );
    }
    None
}

fn play_through(shared: &Shared, play: &Play) {
    shared.signal(LifecycleEvent::Starting);
    log::debug!(
        target: "audio::scheduler",
        "playing '{}' ({} segment(s), {}ms)",
        play.recipe_id,
        play.segments.len(),
        play.total_ms()
    );

    let began = Instant::now();
    for segment in &play.segments {
        match segment {
            Segment::Sound(tone) => sound(&*shared.backend, &play.recipe_id, tone),
            Segment::Silence { .. } => thread::sleep(segment.duration()),
        }
    }
    shared.record_telemetry(
        Duration::from_millis(play.total_ms()),
        began.elapsed(),
        LATE_TOLERANCE,
    );

    shared.signal(LifecycleEvent::Finished);
}

/// Synthesize and play one tone. Failures drop the segment, never the queue.
fn sound(backend: &dyn SoundBackend, recipe_id: &str, tone: &Tone) {
    let result = backend.synthesize(tone).and_then(|unit| backend.play(&unit));
    if let Err(e) = result {
        log::warn!(target: "audio::backend", "'{}' segment dropped: {}", recipe_id, e);
    }
}

/// Leaves the gate consistent if a backend panics on the worker thread, so
/// the next enqueue can start a fresh worker.
struct UnwindGuard<'a>(&'a Shared);

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            let mut state = self.0.lock();
            state.active = false;
            state.playing = false;
            self.0.changed.notify_all();
            log::error!(target: "audio::scheduler", "playback worker panicked");
        }
    }
}
