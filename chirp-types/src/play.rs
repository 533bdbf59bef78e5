use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::voice::{AttackCurve, Effect, Waveform};

/// A fully resolved tone, ready to hand to the synthesis backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_freq: f32,
    pub end_freq: f32,
    pub start_vol: f32,
    pub end_vol: f32,
    pub duration_ms: u32,
    pub effect: Effect,
    pub attack: AttackCurve,
}

impl Tone {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }
}

/// One unit within a play: a sounding tone or an in-play gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Sound(Tone),
    Silence { duration_ms: u32 },
}

impl Segment {
    pub fn duration_ms(&self) -> u32 {
        match self {
            Segment::Sound(tone) => tone.duration_ms,
            Segment::Silence { duration_ms } => *duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms()))
    }

    pub fn tone(&self) -> Option<&Tone> {
        match self {
            Segment::Sound(tone) => Some(tone),
            Segment::Silence { .. } => None,
        }
    }
}

/// The compiled output of one performance of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub recipe_id: String,
    pub segments: Vec<Segment>,
}

impl Play {
    pub fn new(recipe_id: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            segments,
        }
    }

    /// Sum of all segment durations.
    pub fn total_ms(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.duration_ms())).sum()
    }

    pub fn tones(&self) -> impl Iterator<Item = &Tone> {
        self.segments.iter().filter_map(Segment::tone)
    }
}

/// A pause queued between plays. It does not count as playing and raises
/// no lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedPause {
    pub duration_ms: u32,
}

impl QueuedPause {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }
}

/// An entry in the play queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueueItem {
    Play(Play),
    Pause(QueuedPause),
}

impl From<Play> for QueueItem {
    fn from(play: Play) -> Self {
        QueueItem::Play(play)
    }
}

impl From<QueuedPause> for QueueItem {
    fn from(pause: QueuedPause) -> Self {
        QueueItem::Pause(pause)
    }
}
