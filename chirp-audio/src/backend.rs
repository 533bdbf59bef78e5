//! Synthesis backend trait: the seam between the playback scheduler and
//! whatever actually turns a tone into sound.
//!
//! `SoundBackend` captures the two operations playback needs (prepare a tone,
//! play it to completion) independently of how they are carried out. This
//! lets the scheduler be tested without an audio device.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chirp_types::Tone;
use crossbeam_channel::{Receiver, Sender};

/// Result type for backend operations.
pub type BackendResult<T = ()> = Result<T, BackendError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("synthesis failed: {0}")]
    Synthesis(String),
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Opaque token for a synthesized tone. The backend decides what the handle
/// refers to; the scheduler only passes it back to [`SoundBackend::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayableUnit {
    pub handle: u64,
    pub duration: Duration,
}

/// Semantic-level synthesis backend.
pub trait SoundBackend: Send + Sync {
    /// Turn a resolved tone into something playable.
    fn synthesize(&self, tone: &Tone) -> BackendResult<PlayableUnit>;

    /// Play a unit, blocking the caller until it has finished sounding.
    fn play(&self, unit: &PlayableUnit) -> BackendResult;
}

#[derive(Debug, Default)]
struct HandleCounter(AtomicU64);

impl HandleCounter {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// ─── NullBackend ────────────────────────────────────────────────────

/// A no-op backend: every tone "plays" instantly.
#[derive(Debug, Default)]
pub struct NullBackend {
    handles: HandleCounter,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SoundBackend for NullBackend {
    fn synthesize(&self, tone: &Tone) -> BackendResult<PlayableUnit> {
        Ok(PlayableUnit {
            handle: self.handles.next(),
            duration: tone.duration(),
        })
    }

    fn play(&self, _: &PlayableUnit) -> BackendResult {
        Ok(())
    }
}

// ─── PacedBackend ───────────────────────────────────────────────────

/// Blocks for each tone's nominal duration without producing audio.
/// Stands in for a real engine where wall-clock timing matters.
#[derive(Debug, Default)]
pub struct PacedBackend {
    handles: HandleCounter,
}

impl PacedBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SoundBackend for PacedBackend {
    fn synthesize(&self, tone: &Tone) -> BackendResult<PlayableUnit> {
        log::trace!(
            target: "audio::backend",
            "{} {:.0}->{:.0}Hz vol {:.0}->{:.0} {}ms attack {} effect {}",
            tone.waveform.name(),
            tone.start_freq,
            tone.end_freq,
            tone.start_vol,
            tone.end_vol,
            tone.duration_ms,
            tone.attack.name(),
            tone.effect.name()
        );
        Ok(PlayableUnit {
            handle: self.handles.next(),
            duration: tone.duration(),
        })
    }

    fn play(&self, unit: &PlayableUnit) -> BackendResult {
        thread::sleep(unit.duration);
        Ok(())
    }
}

// ─── Test Backend ───────────────────────────────────────────────────

/// How long a gated `play` waits for a release before failing.
const GATE_TIMEOUT: Duration = Duration::from_secs(5);

/// An operation recorded by `TestBackend` for assertion in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOp {
    Synthesize { handle: u64, tone: Tone },
    Play { handle: u64 },
}

/// A backend that records every operation. In gated mode each `play` blocks
/// until the paired `Sender` releases it, so tests can hold the scheduler
/// mid-play.
pub struct TestBackend {
    ops: Mutex<Vec<TestOp>>,
    handles: HandleCounter,
    gate: Option<Receiver<()>>,
    fail_synthesis: AtomicBool,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            handles: HandleCounter::default(),
            gate: None,
            fail_synthesis: AtomicBool::new(false),
        }
    }

    /// Create a gated backend. Send `()` once per `play` to let it finish.
    pub fn gated() -> (Self, Sender<()>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut backend = Self::new();
        backend.gate = Some(rx);
        (backend, tx)
    }

    /// Make every subsequent `synthesize` call fail.
    pub fn set_fail_synthesis(&self, fail: bool) {
        self.fail_synthesis.store(fail, Ordering::Relaxed);
    }

    /// Return all recorded operations.
    pub fn operations(&self) -> Vec<TestOp> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of `play` calls entered so far (including ones still blocked).
    pub fn play_count(&self) -> usize {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|op| matches!(op, TestOp::Play { .. }))
            .count()
    }

    /// Tones in the order they were handed to `play`.
    pub fn tones_played(&self) -> Vec<Tone> {
        let ops = self.ops.lock().unwrap_or_else(PoisonError::into_inner);
        ops.iter()
            .filter_map(|op| match op {
                TestOp::Play { handle } => ops.iter().find_map(|o| match o {
                    TestOp::Synthesize { handle: h, tone } if h == handle => Some(*tone),
                    _ => None,
                }),
                _ => None,
            })
            .collect()
    }

    /// Poll until at least `count` plays have been entered.
    pub fn wait_for_plays(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.play_count() >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.play_count() >= count
    }

    fn record(&self, op: TestOp) {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).push(op);
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundBackend for TestBackend {
    fn synthesize(&self, tone: &Tone) -> BackendResult<PlayableUnit> {
        if self.fail_synthesis.load(Ordering::Relaxed) {
            return Err(BackendError::Synthesis("test backend set to fail".to_string()));
        }
        let handle = self.handles.next();
        self.record(TestOp::Synthesize {
            handle,
            tone: *tone,
        });
        Ok(PlayableUnit {
            handle,
            duration: tone.duration(),
        })
    }

    fn play(&self, unit: &PlayableUnit) -> BackendResult {
        self.record(TestOp::Play {
            handle: unit.handle,
        });
        if let Some(gate) = &self.gate {
            gate.recv_timeout(GATE_TIMEOUT)
                .map_err(|e| BackendError::Playback(format!("test gate: {}", e)))?;
        }
        Ok(())
    }
}

/// Wraps `Arc<TestBackend>` so the scheduler can own a `Box<dyn SoundBackend>`
/// while tests retain an `Arc` for assertions.
pub struct SharedTestBackend(pub Arc<TestBackend>);

impl SoundBackend for SharedTestBackend {
    fn synthesize(&self, tone: &Tone) -> BackendResult<PlayableUnit> {
        self.0.synthesize(tone)
    }
    fn play(&self, unit: &PlayableUnit) -> BackendResult {
        self.0.play(unit)
    }
}
