//! SoundBoard: the caller-facing surface. Owns the recipe registry and the
//! playback scheduler; share it behind an `Arc` across threads.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chirp_audio::{GateStatus, LifecycleEvent, Scheduler, SoundBackend};
use chirp_types::{BuiltinSlot, PerformanceDefaults, Play, ProfilePoint, Recipe, Voice};
use crossbeam_channel::Receiver;

use crate::builtins::register_builtins;
use crate::compiler::compile;
use crate::config::Config;
use crate::registry::RecipeRegistry;

pub struct SoundBoard {
    registry: RwLock<RecipeRegistry>,
    scheduler: Scheduler,
}

impl SoundBoard {
    pub fn new(backend: Box<dyn SoundBackend>, config: &Config) -> Self {
        let mut registry =
            RecipeRegistry::with_settings(config.ratio_limits(), config.fallback_defaults());
        if config.register_builtins() {
            register_builtins(&mut registry);
        }
        Self::with_parts(registry, Scheduler::new(backend))
    }

    pub fn with_parts(registry: RecipeRegistry, scheduler: Scheduler) -> Self {
        Self {
            registry: RwLock::new(registry),
            scheduler,
        }
    }

    fn registry(&self) -> RwLockReadGuard<'_, RecipeRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, RecipeRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Performance ────────────────────────────────────────────────

    /// Compile `id` without queueing it. `None` if there is no such recipe.
    pub fn compile(&self, id: &str, freq: f32, vol: f32, ms: u32) -> Option<Play> {
        self.registry().lookup(id).map(|recipe| compile(recipe, freq, vol, ms))
    }

    /// Compile `id`, queue the result and make sure playback is running
    /// (unless paused). An unknown id queues nothing; returns whether
    /// anything was queued.
    pub fn compile_and_enqueue(&self, id: &str, freq: f32, vol: f32, ms: u32) -> bool {
        let Some(play) = self.compile(id, freq, vol, ms) else {
            log::debug!(target: "core::registry", "no recipe '{}'; nothing queued", id);
            return false;
        };
        self.scheduler.enqueue(play);
        self.scheduler.ensure_started();
        true
    }

    /// Queue a pause that delays the next play without counting as playing.
    pub fn enqueue_silence(&self, ms: u32) {
        self.scheduler.enqueue_pause(ms);
        self.scheduler.ensure_started();
    }

    pub fn await_next_start(&self) {
        self.scheduler.await_next_start();
    }

    pub fn await_next_start_timeout(&self, timeout: Duration) -> bool {
        self.scheduler.await_next_start_timeout(timeout)
    }

    pub fn await_current_finish(&self) {
        self.scheduler.await_current_finish();
    }

    pub fn await_current_finish_timeout(&self, timeout: Duration) -> bool {
        self.scheduler.await_current_finish_timeout(timeout)
    }

    pub fn await_all_finished(&self) {
        self.scheduler.await_all_finished();
    }

    pub fn await_all_finished_timeout(&self, timeout: Duration) -> bool {
        self.scheduler.await_all_finished_timeout(timeout)
    }

    pub fn queue_length(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pause_playback(&self) {
        self.scheduler.pause();
    }

    pub fn resume_playback(&self) {
        self.scheduler.resume();
    }

    pub fn clear_queue(&self) -> usize {
        self.scheduler.clear()
    }

    pub fn status(&self) -> GateStatus {
        self.scheduler.status()
    }

    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        self.scheduler.subscribe()
    }

    // ─── Recipes ────────────────────────────────────────────────────

    pub fn define_single_part(
        &self,
        slot: Option<BuiltinSlot>,
        id: &str,
        voice: Voice,
        start: ProfilePoint,
        end: ProfilePoint,
        defaults: PerformanceDefaults,
    ) {
        self.registry_mut()
            .define_single_part(slot, id, voice, start, end, defaults);
    }

    pub fn append_part(&self, id: &str, voice: Voice, time_ratio: f32, end: ProfilePoint) -> bool {
        self.registry_mut().append_part(id, voice, time_ratio, end)
    }

    pub fn append_silent_gap(&self, id: &str, time_ratio: f32, resume: ProfilePoint) -> bool {
        self.registry_mut().append_silent_gap(id, time_ratio, resume)
    }

    pub fn store(&self, slot: Option<BuiltinSlot>, recipe: Recipe) {
        self.registry_mut().store(slot, recipe);
    }

    pub fn lookup(&self, id: &str) -> Option<Recipe> {
        self.registry().lookup(id).cloned()
    }

    pub fn recipe_ids(&self) -> Vec<String> {
        self.registry().ids().into_iter().map(str::to_string).collect()
    }
}
