use serde::{Deserialize, Serialize};

use crate::voice::Voice;

/// Maximum number of parts in a recipe.
pub const MAX_PARTS: usize = 3;

/// Ceilings applied to profile ratios when a recipe is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioLimits {
    pub max_freq_ratio: f32,
    pub max_vol_ratio: f32,
}

impl Default for RatioLimits {
    fn default() -> Self {
        Self {
            max_freq_ratio: 4.0,
            max_vol_ratio: 4.0,
        }
    }
}

impl RatioLimits {
    pub fn clamp_point(&self, point: ProfilePoint) -> ProfilePoint {
        ProfilePoint {
            freq_ratio: clamp_ratio(point.freq_ratio, self.max_freq_ratio),
            vol_ratio: clamp_ratio(point.vol_ratio, self.max_vol_ratio),
        }
    }
}

/// NaN and negatives collapse to zero.
fn clamp_ratio(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

/// A (frequency, volume) boundary expressed as fractions of the
/// performance's base frequency and peak volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub freq_ratio: f32,
    pub vol_ratio: f32,
}

impl ProfilePoint {
    pub const UNITY: ProfilePoint = ProfilePoint {
        freq_ratio: 1.0,
        vol_ratio: 1.0,
    };

    pub fn new(freq_ratio: f32, vol_ratio: f32) -> Self {
        Self {
            freq_ratio,
            vol_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub voice: Voice,
    /// Fraction of the performance duration this part occupies.
    pub time_ratio: f32,
    /// A silent gap compiles to a pause rather than a tone.
    pub silent_gap: bool,
}

/// Fallback performance parameters. A zero in a performance request
/// selects the matching field here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceDefaults {
    pub freq: f32,
    pub vol: f32,
    pub ms: u32,
}

impl Default for PerformanceDefaults {
    fn default() -> Self {
        Self {
            freq: 440.0,
            vol: 128.0,
            ms: 500,
        }
    }
}

impl PerformanceDefaults {
    pub fn new(freq: f32, vol: f32, ms: u32) -> Self {
        Self { freq, vol, ms }
    }

    /// Replace every non-positive field with the matching field of `fallback`.
    pub fn or(self, fallback: PerformanceDefaults) -> Self {
        Self {
            freq: if self.freq > 0.0 { self.freq } else { fallback.freq },
            vol: if self.vol > 0.0 { self.vol } else { fallback.vol },
            ms: if self.ms > 0 { self.ms } else { fallback.ms },
        }
    }
}

/// A named, reusable sound shape of one to three parts.
///
/// Part `k` runs from profile point `k` to profile point `k + 1`, so
/// adjacent parts always share a boundary. The first part is elastic: it
/// owns whatever share of the duration the later parts have not claimed,
/// which keeps the time ratios summing to exactly 1.0.
///
/// Recipes are never edited in place. Every builder method returns a new
/// recipe which the caller stores under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    id: String,
    parts: Vec<Part>,
    points: Vec<ProfilePoint>,
    defaults: PerformanceDefaults,
}

impl Recipe {
    pub fn single_part(
        id: impl Into<String>,
        voice: Voice,
        start: ProfilePoint,
        end: ProfilePoint,
        defaults: PerformanceDefaults,
        limits: &RatioLimits,
    ) -> Self {
        Self {
            id: id.into(),
            parts: vec![Part {
                voice,
                time_ratio: 1.0,
                silent_gap: false,
            }],
            points: vec![limits.clamp_point(start), limits.clamp_point(end)],
            defaults,
        }
    }

    /// Append a sounding part ending at `end`. Its `time_ratio` is clamped to
    /// the share the first part still owns and taken from it.
    ///
    /// Returns `None` once the recipe already has [`MAX_PARTS`] parts.
    pub fn with_part(
        &self,
        voice: Voice,
        time_ratio: f32,
        end: ProfilePoint,
        limits: &RatioLimits,
    ) -> Option<Self> {
        if self.parts.len() >= MAX_PARTS {
            return None;
        }
        let mut next = self.clone();
        let share = next.claim_share(time_ratio);
        next.parts.push(Part {
            voice,
            time_ratio: share,
            silent_gap: false,
        });
        next.points.push(limits.clamp_point(end));
        Some(next)
    }

    /// Append a silent gap as the middle part. `resume` is the profile point
    /// the following part starts from.
    ///
    /// Only valid directly after the first part; returns `None` otherwise.
    /// Until a third part is appended the gap is a trailing rest: the play
    /// keeps its full duration and stays "playing" through the silence.
    pub fn with_silent_gap(
        &self,
        time_ratio: f32,
        resume: ProfilePoint,
        limits: &RatioLimits,
    ) -> Option<Self> {
        if self.parts.len() != 1 {
            return None;
        }
        let mut next = self.clone();
        let share = next.claim_share(time_ratio);
        next.parts.push(Part {
            voice: Voice::silence(),
            time_ratio: share,
            silent_gap: true,
        });
        next.points.push(limits.clamp_point(resume));
        Some(next)
    }

    /// Copy of this recipe stored under a different id.
    pub fn renamed(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }

    fn claim_share(&mut self, requested: f32) -> f32 {
        let budget = self.parts[0].time_ratio;
        let share = if requested.is_nan() {
            0.0
        } else {
            requested.clamp(0.0, budget)
        };
        self.parts[0].time_ratio = budget - share;
        share
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<ProfilePoint> {
        self.points.get(index).copied()
    }

    pub fn defaults(&self) -> PerformanceDefaults {
        self.defaults
    }

    pub fn has_silent_gap(&self) -> bool {
        self.parts.iter().any(|p| p.silent_gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{AttackCurve, Effect, Waveform};

    fn pure() -> Voice {
        Voice::new(Waveform::Pure, AttackCurve::Fast, Effect::None)
    }

    fn base() -> Recipe {
        Recipe::single_part(
            "test",
            pure(),
            ProfilePoint::UNITY,
            ProfilePoint::new(0.9, 0.8),
            PerformanceDefaults::default(),
            &RatioLimits::default(),
        )
    }

    fn ratio_sum(recipe: &Recipe) -> f32 {
        recipe.parts().iter().map(|p| p.time_ratio).sum()
    }

    #[test]
    fn single_part_owns_whole_duration() {
        let r = base();
        assert_eq!(r.parts().len(), 1);
        assert_eq!(r.points().len(), 2);
        assert_eq!(r.parts()[0].time_ratio, 1.0);
        assert!(r.point(2).is_none());
    }

    #[test]
    fn appended_part_takes_share_from_first() {
        let r = base()
            .with_part(pure(), 0.25, ProfilePoint::new(1.2, 0.5), &RatioLimits::default())
            .unwrap();
        assert_eq!(r.parts().len(), 2);
        assert_eq!(r.points().len(), 3);
        assert!((r.parts()[0].time_ratio - 0.75).abs() < 1e-6);
        assert!((r.parts()[1].time_ratio - 0.25).abs() < 1e-6);
        assert!((ratio_sum(&r) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn oversized_share_is_clamped_to_remaining_budget() {
        let limits = RatioLimits::default();
        let r = base()
            .with_part(pure(), 0.7, ProfilePoint::UNITY, &limits)
            .unwrap()
            .with_part(pure(), 0.9, ProfilePoint::UNITY, &limits)
            .unwrap();
        assert!((r.parts()[0].time_ratio - 0.0).abs() < 1e-6);
        assert!((r.parts()[1].time_ratio - 0.7).abs() < 1e-6);
        assert!((r.parts()[2].time_ratio - 0.3).abs() < 1e-6);
        assert!((ratio_sum(&r) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn negative_and_nan_shares_become_zero() {
        let limits = RatioLimits::default();
        let r = base().with_part(pure(), -0.5, ProfilePoint::UNITY, &limits).unwrap();
        assert_eq!(r.parts()[1].time_ratio, 0.0);
        let r = base().with_part(pure(), f32::NAN, ProfilePoint::UNITY, &limits).unwrap();
        assert_eq!(r.parts()[1].time_ratio, 0.0);
        assert_eq!(r.parts()[0].time_ratio, 1.0);
    }

    #[test]
    fn fourth_part_is_refused() {
        let limits = RatioLimits::default();
        let full = base()
            .with_part(pure(), 0.3, ProfilePoint::UNITY, &limits)
            .unwrap()
            .with_part(pure(), 0.3, ProfilePoint::UNITY, &limits)
            .unwrap();
        assert!(full.with_part(pure(), 0.1, ProfilePoint::UNITY, &limits).is_none());
    }

    #[test]
    fn silent_gap_only_in_middle() {
        let limits = RatioLimits::default();
        let gapped = base()
            .with_silent_gap(0.2, ProfilePoint::new(1.0, 1.0), &limits)
            .unwrap();
        assert!(gapped.has_silent_gap());
        assert!(gapped.parts()[1].silent_gap);
        assert!(gapped.parts()[1].voice.waveform.is_silent());
        assert!(gapped.with_silent_gap(0.1, ProfilePoint::UNITY, &limits).is_none());

        let double = gapped.with_part(pure(), 0.4, ProfilePoint::new(0.5, 0.5), &limits).unwrap();
        assert_eq!(double.parts().len(), 3);
        assert!(double.with_silent_gap(0.1, ProfilePoint::UNITY, &limits).is_none());
    }

    #[test]
    fn profile_ratios_are_clamped() {
        let limits = RatioLimits::default();
        let r = Recipe::single_part(
            "loud",
            pure(),
            ProfilePoint::new(-1.0, 50.0),
            ProfilePoint::new(f32::NAN, 2.0),
            PerformanceDefaults::default(),
            &limits,
        );
        assert_eq!(r.point(0), Some(ProfilePoint::new(0.0, 4.0)));
        assert_eq!(r.point(1), Some(ProfilePoint::new(0.0, 2.0)));
    }

    #[test]
    fn renamed_keeps_shape() {
        let r = base().renamed("other");
        assert_eq!(r.id(), "other");
        assert_eq!(r.parts(), base().parts());
    }

    #[test]
    fn defaults_fill_non_positive_fields() {
        let fallback = PerformanceDefaults::new(1000.0, 200.0, 300);
        let d = PerformanceDefaults::new(0.0, 50.0, 0).or(fallback);
        assert_eq!(d, PerformanceDefaults::new(1000.0, 50.0, 300));
        let d = PerformanceDefaults::new(-3.0, -1.0, 10).or(fallback);
        assert_eq!(d, PerformanceDefaults::new(1000.0, 200.0, 10));
    }
}
