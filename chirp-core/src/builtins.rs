//! The built-in recipe catalogue, stored positionally by [`BuiltinSlot`].

use chirp_types::{
    AttackCurve, BuiltinSlot, Effect, PerformanceDefaults, ProfilePoint, Voice, Waveform,
};

use crate::registry::RecipeRegistry;

fn voice(waveform: Waveform, attack: AttackCurve, effect: Effect) -> Voice {
    Voice::new(waveform, attack, effect)
}

fn point(freq_ratio: f32, vol_ratio: f32) -> ProfilePoint {
    ProfilePoint::new(freq_ratio, vol_ratio)
}

/// Define every built-in recipe, replacing any stored under the same names.
pub fn register_builtins(registry: &mut RecipeRegistry) {
    for slot in BuiltinSlot::ALL {
        define(registry, slot);
    }
    log::debug!(target: "core::registry", "registered {} built-in recipes", BuiltinSlot::ALL.len());
}

fn define(registry: &mut RecipeRegistry, slot: BuiltinSlot) {
    let id = slot.name();
    match slot {
        BuiltinSlot::Ting => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Pure, AttackCurve::Fast, Effect::None),
                point(1.0, 1.0),
                point(0.9, 0.8),
                PerformanceDefaults::new(2000.0, 160.0, 250),
            );
        }
        BuiltinSlot::Chirp => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Pure, AttackCurve::Fast, Effect::None),
                point(1.0, 0.6),
                point(1.8, 1.0),
                PerformanceDefaults::new(1500.0, 140.0, 180),
            );
            registry.append_part(
                id,
                voice(Waveform::Pure, AttackCurve::Fast, Effect::None),
                0.35,
                point(1.4, 0.2),
            );
        }
        BuiltinSlot::Whoop => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Bright, AttackCurve::Slow, Effect::Vibrato),
                point(0.5, 0.4),
                point(1.5, 1.0),
                PerformanceDefaults::new(500.0, 150.0, 700),
            );
            registry.append_part(
                id,
                voice(Waveform::Bright, AttackCurve::Medium, Effect::Vibrato),
                0.3,
                point(1.5, 0.9),
            );
            registry.append_part(
                id,
                voice(Waveform::Bright, AttackCurve::Medium, Effect::None),
                0.2,
                point(0.8, 0.0),
            );
        }
        BuiltinSlot::Siren => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Buzzy, AttackCurve::Medium, Effect::None),
                point(1.0, 1.0),
                point(1.6, 1.0),
                PerformanceDefaults::new(700.0, 120.0, 1200),
            );
            registry.append_silent_gap(id, 0.1, point(1.0, 1.0));
            registry.append_part(
                id,
                voice(Waveform::Buzzy, AttackCurve::Medium, Effect::None),
                0.45,
                point(1.6, 1.0),
            );
        }
        BuiltinSlot::Bark => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Harsh, AttackCurve::Fast, Effect::None),
                point(1.0, 1.0),
                point(0.7, 0.5),
                PerformanceDefaults::new(350.0, 200.0, 400),
            );
            registry.append_silent_gap(id, 0.2, point(1.2, 0.9));
            registry.append_part(
                id,
                voice(Waveform::Harsh, AttackCurve::Fast, Effect::None),
                0.4,
                point(0.6, 0.1),
            );
        }
        BuiltinSlot::Buzz => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Buzzy, AttackCurve::Delayed, Effect::Tremolo),
                point(1.0, 0.8),
                point(1.0, 0.8),
                PerformanceDefaults::new(150.0, 130.0, 600),
            );
        }
        BuiltinSlot::Zap => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Noisy, AttackCurve::Fast, Effect::Warble),
                point(2.0, 1.0),
                point(0.25, 0.0),
                PerformanceDefaults::new(1200.0, 180.0, 300),
            );
        }
        BuiltinSlot::Blip => {
            registry.define_single_part(
                Some(slot),
                id,
                voice(Waveform::Bright, AttackCurve::Fast, Effect::None),
                point(1.0, 1.0),
                point(1.0, 0.0),
                PerformanceDefaults::new(1800.0, 120.0, 60),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use chirp_types::Segment;

    fn registry() -> RecipeRegistry {
        let mut registry = RecipeRegistry::new();
        register_builtins(&mut registry);
        registry
    }

    #[test]
    fn every_slot_is_registered_by_name() {
        let registry = registry();
        assert_eq!(registry.len(), BuiltinSlot::ALL.len());
        for slot in BuiltinSlot::ALL {
            assert_eq!(registry.lookup(slot.name()).unwrap().id(), slot.name());
        }
    }

    #[test]
    fn builtin_time_ratios_sum_to_one() {
        let registry = registry();
        for id in registry.ids() {
            let sum: f32 = registry.lookup(id).unwrap().parts().iter().map(|p| p.time_ratio).sum();
            assert!((sum - 1.0).abs() < 1e-5, "{} sums to {}", id, sum);
        }
    }

    #[test]
    fn double_recipes_have_a_middle_gap() {
        let registry = registry();
        for id in ["siren", "bark"] {
            let play = compile(registry.lookup(id).unwrap(), 0.0, 0.0, 0);
            assert_eq!(play.segments.len(), 3, "{}", id);
            assert!(matches!(play.segments[1], Segment::Silence { .. }), "{}", id);
        }
    }

    #[test]
    fn siren_uses_its_defaults() {
        let registry = registry();
        let play = compile(registry.lookup("siren").unwrap(), 0.0, 0.0, 0);
        assert_eq!(play.total_ms(), 1200);
        let first = play.segments[0].tone().unwrap();
        assert_eq!(first.start_freq, 700.0);
        assert_eq!(first.start_vol, 120.0);
    }

    #[test]
    fn whoop_has_three_sounding_parts() {
        let registry = registry();
        let play = compile(registry.lookup("whoop").unwrap(), 0.0, 0.0, 0);
        assert_eq!(play.tones().count(), 3);
    }
}
