use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visual treatment applied to a face region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Blur,
    Pixelate,
    Blackout,
    Emoji,
}

impl EffectKind {
    /// Cycle order used by the interactive toggle.
    pub const ALL: &[EffectKind] = &[
        EffectKind::Blur,
        EffectKind::Pixelate,
        EffectKind::Blackout,
        EffectKind::Emoji,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Blur => "blur",
            EffectKind::Pixelate => "pixelate",
            EffectKind::Blackout => "blackout",
            EffectKind::Emoji => "emoji",
        }
    }

    /// The effect after this one, wrapping back to the first.
    pub fn next(self) -> EffectKind {
        let pos = Self::ALL.iter().position(|&e| e == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name() == lowered)
            .ok_or_else(|| {
                format!("Effect must be one of: blur, pixelate, blackout, emoji, got '{s}'")
            })
    }
}
