//! # chirp-types
//!
//! Shared type definitions for the chirp sound engine.
//! Recipes describe the *shape* of a sound as ratios; plays are the
//! fully-resolved, ready-to-synthesize output of compiling a recipe.

mod builtin;
mod play;
mod recipe;
mod voice;

pub use builtin::BuiltinSlot;
pub use play::{Play, QueueItem, QueuedPause, Segment, Tone};
pub use recipe::{Part, PerformanceDefaults, ProfilePoint, RatioLimits, Recipe, MAX_PARTS};
pub use voice::{AttackCurve, Effect, Voice, Waveform};
