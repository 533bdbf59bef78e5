use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    Pure,
    Buzzy,
    Bright,
    Harsh,
    Noisy,
    Silence,
}

impl Waveform {
    pub const ALL: [Waveform; 6] = [
        Waveform::Pure,
        Waveform::Buzzy,
        Waveform::Bright,
        Waveform::Harsh,
        Waveform::Noisy,
        Waveform::Silence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Pure => "pure",
            Waveform::Buzzy => "buzzy",
            Waveform::Bright => "bright",
            Waveform::Harsh => "harsh",
            Waveform::Noisy => "noisy",
            Waveform::Silence => "silence",
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Waveform::Silence)
    }
}

/// How quickly a tone reaches its start volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackCurve {
    Slow,
    #[default]
    Medium,
    Fast,
    Delayed,
}

impl AttackCurve {
    pub fn name(&self) -> &'static str {
        match self {
            AttackCurve::Slow => "slow",
            AttackCurve::Medium => "medium",
            AttackCurve::Fast => "fast",
            AttackCurve::Delayed => "delayed",
        }
    }
}

/// Modulation effect applied by the synthesis engine. Depth is left to the
/// engine; only the kind is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Effect {
    #[default]
    None,
    Vibrato,
    Tremolo,
    Warble,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Vibrato => "vibrato",
            Effect::Tremolo => "tremolo",
            Effect::Warble => "warble",
        }
    }
}

/// The timbre of one recipe part: everything except its timing and profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Voice {
    pub waveform: Waveform,
    pub attack: AttackCurve,
    pub effect: Effect,
}

impl Voice {
    pub fn new(waveform: Waveform, attack: AttackCurve, effect: Effect) -> Self {
        Self {
            waveform,
            attack,
            effect,
        }
    }

    /// The voice used for silent gaps.
    pub fn silence() -> Self {
        Self {
            waveform: Waveform::Silence,
            attack: AttackCurve::default(),
            effect: Effect::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_names_are_unique() {
        let mut names: Vec<&str> = Waveform::ALL.iter().map(|w| w.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Waveform::ALL.len());
    }

    #[test]
    fn only_silence_is_silent() {
        for w in Waveform::ALL {
            assert_eq!(w.is_silent(), w == Waveform::Silence);
        }
        assert!(Voice::silence().waveform.is_silent());
    }
}
