use serde::{Deserialize, Serialize};

/// Positional address of a built-in recipe. Built-ins are stored in the
/// registry under their canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinSlot {
    Ting,
    Chirp,
    Whoop,
    Siren,
    Bark,
    Buzz,
    Zap,
    Blip,
}

impl BuiltinSlot {
    pub const ALL: [BuiltinSlot; 8] = [
        BuiltinSlot::Ting,
        BuiltinSlot::Chirp,
        BuiltinSlot::Whoop,
        BuiltinSlot::Siren,
        BuiltinSlot::Bark,
        BuiltinSlot::Buzz,
        BuiltinSlot::Zap,
        BuiltinSlot::Blip,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinSlot::Ting => "ting",
            BuiltinSlot::Chirp => "chirp",
            BuiltinSlot::Whoop => "whoop",
            BuiltinSlot::Siren => "siren",
            BuiltinSlot::Bark => "bark",
            BuiltinSlot::Buzz => "buzz",
            BuiltinSlot::Zap => "zap",
            BuiltinSlot::Blip => "blip",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.name() == name)
    }
}

impl std::fmt::Display for BuiltinSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
