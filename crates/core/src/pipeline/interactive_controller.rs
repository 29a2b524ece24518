use crate::anonymizing::domain::effect_kind::EffectKind;

use super::key_source::{KeyPress, KeySource};

/// What the runner should do after a key poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerSignal {
    pub quit: bool,
    pub snapshot: bool,
}

/// Owns the active effect for a live session and maps key presses to
/// effect changes, snapshots and quit.
///
/// | key             | action                    |
/// |-----------------|---------------------------|
/// | `b` `p` `k` `e` | blur, pixelate, blackout, emoji |
/// | `1`..`4`        | same, by position         |
/// | space, `n`      | next effect               |
/// | `s`             | snapshot                  |
/// | `q`, Esc        | quit                      |
pub struct InteractiveController {
    effect: EffectKind,
    quit: bool,
}

impl InteractiveController {
    pub fn new(initial: EffectKind) -> Self {
        Self {
            effect: initial,
            quit: false,
        }
    }

    pub fn effect(&self) -> EffectKind {
        self.effect
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Drains every pending key. With no input the state is unchanged.
    pub fn poll(&mut self, keys: &mut dyn KeySource) -> ControllerSignal {
        let mut signal = ControllerSignal::default();
        while let Some(key) = keys.poll() {
            let step = self.handle(key);
            signal.quit |= step.quit;
            signal.snapshot |= step.snapshot;
        }
        signal
    }

    pub fn handle(&mut self, key: KeyPress) -> ControllerSignal {
        let mut signal = ControllerSignal::default();
        let selected = match key {
            KeyPress::Escape => {
                signal.quit = true;
                None
            }
            KeyPress::Space => Some(self.effect.next()),
            KeyPress::Char(c) => match c.to_ascii_lowercase() {
                'q' => {
                    signal.quit = true;
                    None
                }
                's' => {
                    signal.snapshot = true;
                    None
                }
                'n' => Some(self.effect.next()),
                'b' => Some(EffectKind::Blur),
                'p' => Some(EffectKind::Pixelate),
                'k' => Some(EffectKind::Blackout),
                'e' => Some(EffectKind::Emoji),
                d @ '1'..='9' => {
                    let pos = d as usize - '1' as usize;
                    EffectKind::ALL.get(pos).copied()
                }
                _ => None,
            },
        };

        if let Some(effect) = selected {
            if effect != self.effect {
                log::info!("Effect: {} -> {}", self.effect, effect);
                self.effect = effect;
            }
        }
        if signal.quit {
            log::info!("Quit requested");
            self.quit = true;
        }
        signal
    }
}
