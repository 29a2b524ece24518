use std::path::Path;

use crate::anonymizing::domain::overlay_asset::OverlayAsset;
use crate::shared::error::AnonymizeError;

/// Decodes an overlay image from disk.
///
/// Images with an alpha channel are kept as RGBA so the emoji effect can
/// blend them; everything else is converted to RGB.
pub fn load_overlay(path: &Path) -> Result<OverlayAsset, AnonymizeError> {
    let img = image::open(path).map_err(|e| AnonymizeError::unreadable(path, e))?;
    let (width, height) = (img.width(), img.height());

    let asset = if img.color().has_alpha() {
        OverlayAsset::new(img.to_rgba8().into_raw(), width, height, 4)?
    } else {
        OverlayAsset::new(img.to_rgb8().into_raw(), width, height, 3)?
    };

    log::info!(
        "Loaded overlay {} ({}x{}, alpha={})",
        path.display(),
        width,
        height,
        asset.has_alpha()
    );
    Ok(asset)
}
