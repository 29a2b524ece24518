use std::sync::Arc;

use crate::anonymizing::domain::effect_kind::EffectKind;
use crate::anonymizing::domain::frame_anonymizer::FrameAnonymizer;
use crate::anonymizing::domain::overlay_asset::OverlayAsset;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;
use crate::shared::settings::AnonymizeSettings;

use super::blackout::Blackout;
use super::box_blurrer::BoxBlurrer;
use super::emoji_overlay::EmojiOverlay;
use super::pixelator::Pixelator;

/// One configured anonymizer per effect, selected per call.
///
/// The active effect can change between frames (webcam key presses), so all
/// four are built up front from the same settings.
pub struct AnonymizerSet {
    blur: BoxBlurrer,
    pixelate: Pixelator,
    blackout: Blackout,
    emoji: EmojiOverlay,
}

impl AnonymizerSet {
    pub fn new(settings: &AnonymizeSettings, overlay: Option<Arc<OverlayAsset>>) -> Self {
        log::info!(
            "Anonymizers ready (blur kernel={}, pixel divisor={}, max pixel size={}, overlay={})",
            settings.blur_kernel_size,
            settings.pixel_divisor,
            settings.max_pixel_size,
            if overlay.is_some() { "loaded" } else { "none" },
        );
        Self {
            blur: BoxBlurrer::new(settings.blur_kernel_size),
            pixelate: Pixelator::new(settings.pixel_divisor, settings.max_pixel_size),
            blackout: Blackout,
            emoji: EmojiOverlay::new(overlay),
        }
    }

    pub fn get(&self, effect: EffectKind) -> &dyn FrameAnonymizer {
        match effect {
            EffectKind::Blur => &self.blur,
            EffectKind::Pixelate => &self.pixelate,
            EffectKind::Blackout => &self.blackout,
            EffectKind::Emoji => &self.emoji,
        }
    }

    pub fn apply(
        &self,
        frame: &mut Frame,
        rect: &PixelRect,
        effect: EffectKind,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.get(effect).anonymize(frame, rect)
    }

    pub fn has_overlay(&self) -> bool {
        self.emoji.has_asset()
    }
}

impl Default for AnonymizerSet {
    fn default() -> Self {
        Self::new(&AnonymizeSettings::default(), None)
    }
}
