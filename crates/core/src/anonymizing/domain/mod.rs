pub mod effect_kind;
pub mod frame_anonymizer;
pub mod overlay_asset;
