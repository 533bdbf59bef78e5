//! Profile compiler: scale a recipe's ratios by one performance's base
//! frequency, peak volume and duration.

use chirp_types::{Part, PerformanceDefaults, Play, ProfilePoint, Recipe, Segment, Tone};

/// Compile `recipe` into a play. A zero (or negative) `freq` or `vol`, or a
/// zero `ms`, selects the recipe's own default for that axis only.
///
/// Segment durations always sum to exactly `ms` (after defaulting): each
/// part ends at the rounded cumulative boundary and the last part runs to
/// the end.
pub fn compile(recipe: &Recipe, freq: f32, vol: f32, ms: u32) -> Play {
    let perf = PerformanceDefaults::new(freq, vol, ms).or(recipe.defaults());
    let durations = partition(perf.ms, recipe.parts());

    let segments = recipe
        .parts()
        .iter()
        .zip(durations)
        .enumerate()
        .map(|(k, (part, duration_ms))| {
            if part.silent_gap {
                return Segment::Silence { duration_ms };
            }
            let start = resolve(recipe.point(k), &perf);
            let end = resolve(recipe.point(k + 1), &perf);
            Segment::Sound(Tone {
                waveform: part.voice.waveform,
                start_freq: start.0,
                end_freq: end.0,
                start_vol: start.1,
                end_vol: end.1,
                duration_ms,
                effect: part.voice.effect,
                attack: part.voice.attack,
            })
        })
        .collect();

    log::trace!(
        target: "core::compiler",
        "compiled '{}' at {}Hz vol {} over {}ms",
        recipe.id(),
        perf.freq,
        perf.vol,
        perf.ms
    );
    Play::new(recipe.id(), segments)
}

/// Absolute (freq, vol) of a profile point.
fn resolve(point: Option<ProfilePoint>, perf: &PerformanceDefaults) -> (f32, f32) {
    let point = point.unwrap_or(ProfilePoint::UNITY);
    (perf.freq * point.freq_ratio, perf.vol * point.vol_ratio)
}

fn partition(ms: u32, parts: &[Part]) -> Vec<u32> {
    let total = f64::from(ms);
    let mut cumulative = 0.0_f64;
    let mut boundary = 0_u32;
    let mut durations = Vec::with_capacity(parts.len());

    for (i, part) in parts.iter().enumerate() {
        cumulative += f64::from(part.time_ratio);
        let next = if i + 1 == parts.len() {
            ms
        } else {
            (total * cumulative).round().clamp(0.0, total) as u32
        };
        let next = next.max(boundary);
        durations.push(next - boundary);
        boundary = next;
    }
    durations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_types::{AttackCurve, Effect, RatioLimits, Voice, Waveform};

    fn voice(waveform: Waveform) -> Voice {
        Voice::new(waveform, AttackCurve::Fast, Effect::None)
    }

    fn ting() -> Recipe {
        Recipe::single_part(
            "ting",
            voice(Waveform::Pure),
            ProfilePoint::new(1.0, 1.0),
            ProfilePoint::new(0.9, 0.8),
            PerformanceDefaults::new(1000.0, 150.0, 300),
            &RatioLimits::default(),
        )
    }

    fn three_part() -> Recipe {
        let limits = RatioLimits::default();
        ting()
            .with_part(voice(Waveform::Buzzy), 0.3, ProfilePoint::new(1.5, 0.6), &limits)
            .unwrap()
            .with_part(voice(Waveform::Harsh), 0.3, ProfilePoint::new(0.5, 0.1), &limits)
            .unwrap()
    }

    fn sounds(play: &Play) -> Vec<Tone> {
        play.tones().copied().collect()
    }

    #[test]
    fn ting_scenario() {
        let play = compile(&ting(), 800.0, 200.0, 400);
        assert_eq!(play.segments.len(), 1);
        let tone = sounds(&play)[0];
        assert_eq!(tone.start_freq, 800.0);
        assert_eq!(tone.start_vol, 200.0);
        assert!((tone.end_freq - 720.0).abs() < 1e-3);
        assert!((tone.end_vol - 160.0).abs() < 1e-3);
        assert_eq!(tone.duration_ms, 400);
        assert_eq!(tone.waveform, Waveform::Pure);
        assert_eq!(tone.attack, AttackCurve::Fast);
    }

    #[test]
    fn zero_selects_default_per_axis() {
        let play = compile(&ting(), 0.0, 200.0, 400);
        let tone = sounds(&play)[0];
        assert_eq!(tone.start_freq, 1000.0);
        assert_eq!(tone.start_vol, 200.0);
        assert_eq!(tone.duration_ms, 400);

        let tone = sounds(&compile(&ting(), 800.0, 0.0, 400))[0];
        assert_eq!((tone.start_freq, tone.start_vol, tone.duration_ms), (800.0, 150.0, 400));

        let play = compile(&ting(), 800.0, 200.0, 0);
        assert_eq!(play.total_ms(), 300);
        assert_eq!(sounds(&play)[0].start_freq, 800.0);
    }

    #[test]
    fn durations_sum_to_requested_length() {
        let recipe = three_part();
        for ms in [1, 7, 100, 333, 1001, 60_000] {
            let play = compile(&recipe, 500.0, 100.0, ms);
            assert_eq!(play.total_ms(), u64::from(ms), "ms = {}", ms);
        }
    }

    #[test]
    fn durations_follow_time_ratios() {
        let play = compile(&three_part(), 500.0, 100.0, 1000);
        let durations: Vec<u32> = play.segments.iter().map(Segment::duration_ms).collect();
        assert_eq!(durations, vec![400, 300, 300]);
    }

    #[test]
    fn adjacent_parts_share_boundaries() {
        let play = compile(&three_part(), 640.0, 90.0, 900);
        let tones = sounds(&play);
        assert_eq!(tones.len(), 3);
        for pair in tones.windows(2) {
            assert_eq!(pair[0].end_freq, pair[1].start_freq);
            assert_eq!(pair[0].end_vol, pair[1].start_vol);
        }
        assert_eq!(tones[0].waveform, Waveform::Pure);
        assert_eq!(tones[1].waveform, Waveform::Buzzy);
        assert_eq!(tones[2].waveform, Waveform::Harsh);
    }

    #[test]
    fn silent_gap_compiles_to_silence_between_sounds() {
        let limits = RatioLimits::default();
        let double = ting()
            .with_silent_gap(0.2, ProfilePoint::new(1.2, 1.0), &limits)
            .unwrap()
            .with_part(voice(Waveform::Pure), 0.4, ProfilePoint::new(0.6, 0.5), &limits)
            .unwrap();

        let play = compile(&double, 500.0, 100.0, 1000);
        assert_eq!(play.segments.len(), 3);
        assert!(matches!(play.segments[0], Segment::Sound(_)));
        assert_eq!(play.segments[1], Segment::Silence { duration_ms: 200 });
        let second = play.segments[2].tone().unwrap();
        assert!((second.start_freq - 600.0).abs() < 1e-3);
        assert!((second.end_freq - 300.0).abs() < 1e-3);
        assert_eq!(second.duration_ms, 400);
        assert_eq!(play.total_ms(), 1000);
    }

    #[test]
    fn unfinished_double_ends_in_a_rest() {
        let limits = RatioLimits::default();
        let half = ting()
            .with_silent_gap(0.25, ProfilePoint::UNITY, &limits)
            .unwrap();

        let play = compile(&half, 500.0, 100.0, 400);
        let durations: Vec<u32> = play.segments.iter().map(Segment::duration_ms).collect();
        assert_eq!(durations, vec![300, 100]);
        assert!(matches!(play.segments[0], Segment::Sound(_)));
        assert_eq!(play.segments[1], Segment::Silence { duration_ms: 100 });
        assert_eq!(play.total_ms(), 400);
    }

    #[test]
    fn rounding_is_absorbed_by_last_part() {
        let limits = RatioLimits::default();
        let thirds = ting()
            .with_part(voice(Waveform::Pure), 1.0 / 3.0, ProfilePoint::UNITY, &limits)
            .unwrap()
            .with_part(voice(Waveform::Pure), 1.0 / 3.0, ProfilePoint::UNITY, &limits)
            .unwrap();
        let play = compile(&thirds, 500.0, 100.0, 10);
        let durations: Vec<u32> = play.segments.iter().map(Segment::duration_ms).collect();
        assert_eq!(durations.iter().sum::<u32>(), 10);
        assert_eq!(durations, vec![3, 4, 3]);
    }

    #[test]
    fn play_is_tagged_with_recipe_id() {
        assert_eq!(compile(&ting(), 0.0, 0.0, 0).recipe_id, "ting");
    }
}
