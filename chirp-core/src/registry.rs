//! Named store of recipes, plus the entry points that build them.
//!
//! Recipes are replaced by name, never edited in place: every construction
//! call looks up the stored recipe, derives a new one and stores it back.

use std::collections::HashMap;

use chirp_types::{BuiltinSlot, PerformanceDefaults, ProfilePoint, RatioLimits, Recipe, Voice};

pub struct RecipeRegistry {
    recipes: HashMap<String, Recipe>,
    limits: RatioLimits,
    fallback: PerformanceDefaults,
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::with_settings(RatioLimits::default(), PerformanceDefaults::default())
    }

    /// `fallback` fills in any zero field of a recipe's own defaults.
    pub fn with_settings(limits: RatioLimits, fallback: PerformanceDefaults) -> Self {
        Self {
            recipes: HashMap::new(),
            limits,
            fallback,
        }
    }

    /// Store `recipe`, replacing any recipe with the same id. A built-in
    /// slot forces the id to that slot's canonical name.
    pub fn store(&mut self, slot: Option<BuiltinSlot>, recipe: Recipe) {
        let recipe = match slot {
            Some(slot) if recipe.id() != slot.name() => recipe.renamed(slot.name()),
            _ => recipe,
        };
        let id = recipe.id().to_string();
        if self.recipes.insert(id.clone(), recipe).is_some() {
            log::debug!(target: "core::registry", "replaced recipe '{}'", id);
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Recipe> {
        self.recipes.remove(id)
    }

    /// Stored ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Define (or redefine) a one-part recipe from `start` to `end`.
    pub fn define_single_part(
        &mut self,
        slot: Option<BuiltinSlot>,
        id: &str,
        voice: Voice,
        start: ProfilePoint,
        end: ProfilePoint,
        defaults: PerformanceDefaults,
    ) {
        let recipe = Recipe::single_part(
            id,
            voice,
            start,
            end,
            defaults.or(self.fallback),
            &self.limits,
        );
        self.store(slot, recipe);
    }

    /// Append a sounding part to the recipe `id`. Returns false (and changes
    /// nothing) if there is no such recipe or it already has three parts.
    pub fn append_part(
        &mut self,
        id: &str,
        voice: Voice,
        time_ratio: f32,
        end: ProfilePoint,
    ) -> bool {
        let limits = self.limits;
        self.derive(id, "part", |recipe| recipe.with_part(voice, time_ratio, end, &limits))
    }

    /// Turn the recipe `id` into a double recipe by appending a silent gap.
    /// `resume` is where the following part starts. Returns false unless the
    /// recipe currently has exactly one part. Without a following part the
    /// gap compiles to a trailing rest inside the play.
    pub fn append_silent_gap(
        &mut self,
        id: &str,
        time_ratio: f32,
        resume: ProfilePoint,
    ) -> bool {
        let limits = self.limits;
        self.derive(id, "silent gap", |recipe| {
            recipe.with_silent_gap(time_ratio, resume, &limits)
        })
    }

    fn derive(
        &mut self,
        id: &str,
        what: &str,
        build: impl FnOnce(&Recipe) -> Option<Recipe>,
    ) -> bool {
        let Some(current) = self.recipes.get(id) else {
            log::debug!(target: "core::registry", "no recipe '{}' to extend", id);
            return false;
        };
        match build(current) {
            Some(next) => {
                self.store(None, next);
                true
            }
            None => {
                log::warn!(
                    target: "core::registry",
                    "'{}' has {} part(s); {} ignored",
                    id,
                    current.parts().len(),
                    what
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_types::{AttackCurve, Effect, Waveform};

    fn voice() -> Voice {
        Voice::new(Waveform::Buzzy, AttackCurve::Medium, Effect::None)
    }

    fn define(registry: &mut RecipeRegistry, id: &str) {
        registry.define_single_part(
            None,
            id,
            voice(),
            ProfilePoint::UNITY,
            ProfilePoint::new(0.5, 0.5),
            PerformanceDefaults::new(600.0, 100.0, 200),
        );
    }

    #[test]
    fn store_replaces_by_name() {
        let mut registry = RecipeRegistry::new();
        define(&mut registry, "beep");
        registry.define_single_part(
            None,
            "beep",
            voice(),
            ProfilePoint::UNITY,
            ProfilePoint::UNITY,
            PerformanceDefaults::new(900.0, 100.0, 200),
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("beep").unwrap().defaults().freq, 900.0);
    }

    #[test]
    fn builtin_slot_forces_canonical_name() {
        let mut registry = RecipeRegistry::new();
        registry.define_single_part(
            Some(BuiltinSlot::Ting),
            "whatever",
            voice(),
            ProfilePoint::UNITY,
            ProfilePoint::UNITY,
            PerformanceDefaults::default(),
        );
        assert!(registry.lookup("whatever").is_none());
        assert_eq!(registry.lookup("ting").unwrap().id(), "ting");
    }

    #[test]
    fn lookup_unknown_is_none() {
        let registry = RecipeRegistry::new();
        assert!(registry.lookup("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn zero_defaults_take_fallback() {
        let mut registry = RecipeRegistry::with_settings(
            RatioLimits::default(),
            PerformanceDefaults::new(1000.0, 50.0, 120),
        );
        registry.define_single_part(
            None,
            "bare",
            voice(),
            ProfilePoint::UNITY,
            ProfilePoint::UNITY,
            PerformanceDefaults::new(0.0, 80.0, 0),
        );
        assert_eq!(
            registry.lookup("bare").unwrap().defaults(),
            PerformanceDefaults::new(1000.0, 80.0, 120)
        );
    }

    #[test]
    fn append_part_replaces_stored_recipe() {
        let mut registry = RecipeRegistry::new();
        define(&mut registry, "two");
        assert!(registry.append_part("two", voice(), 0.4, ProfilePoint::new(2.0, 1.0)));
        let recipe = registry.lookup("two").unwrap();
        assert_eq!(recipe.parts().len(), 2);
        assert_eq!(recipe.point(2), Some(ProfilePoint::new(2.0, 1.0)));
    }

    #[test]
    fn append_to_unknown_or_full_is_a_no_op() {
        let mut registry = RecipeRegistry::new();
        assert!(!registry.append_part("ghost", voice(), 0.5, ProfilePoint::UNITY));
        assert!(registry.is_empty());

        define(&mut registry, "full");
        assert!(registry.append_part("full", voice(), 0.3, ProfilePoint::UNITY));
        assert!(registry.append_part("full", voice(), 0.3, ProfilePoint::UNITY));
        let before = registry.lookup("full").unwrap().clone();
        assert!(!registry.append_part("full", voice(), 0.1, ProfilePoint::UNITY));
        assert!(!registry.append_silent_gap("full", 0.1, ProfilePoint::UNITY));
        assert_eq!(registry.lookup("full").unwrap(), &before);
    }

    #[test]
    fn silent_gap_builds_double_recipe() {
        let mut registry = RecipeRegistry::new();
        define(&mut registry, "double");
        assert!(registry.append_silent_gap("double", 0.2, ProfilePoint::UNITY));
        assert!(registry.append_part("double", voice(), 0.4, ProfilePoint::new(0.5, 0.5)));
        let recipe = registry.lookup("double").unwrap();
        assert!(recipe.has_silent_gap());
        assert_eq!(recipe.parts().len(), 3);
    }

    #[test]
    fn ratio_limits_apply_on_construction() {
        let mut registry = RecipeRegistry::with_settings(
            RatioLimits {
                max_freq_ratio: 2.0,
                max_vol_ratio: 1.0,
            },
            PerformanceDefaults::default(),
        );
        registry.define_single_part(
            None,
            "loud",
            voice(),
            ProfilePoint::new(3.0, 3.0),
            ProfilePoint::new(1.5, 0.5),
            PerformanceDefaults::default(),
        );
        let recipe = registry.lookup("loud").unwrap();
        assert_eq!(recipe.point(0), Some(ProfilePoint::new(2.0, 1.0)));
        assert_eq!(recipe.point(1), Some(ProfilePoint::new(1.5, 0.5)));
    }

    #[test]
    fn ids_are_sorted_and_remove_works() {
        let mut registry = RecipeRegistry::new();
        for id in ["zeta", "alpha", "mid"] {
            define(&mut registry, id);
        }
        assert_eq!(registry.ids(), vec!["alpha", "mid", "zeta"]);
        assert!(registry.remove("mid").is_some());
        assert!(registry.remove("mid").is_none());
        assert_eq!(registry.len(), 2);
    }
}
