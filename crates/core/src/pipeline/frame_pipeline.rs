use std::time::Instant;

use crate::anonymizing::domain::effect_kind::EffectKind;
use crate::anonymizing::infrastructure::anonymizer_set::AnonymizerSet;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;
use crate::shared::settings::AnonymizeSettings;

use super::face_annotator::FaceAnnotator;

/// What one pass over a frame found and did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub detections: Vec<BoundingBox>,
    /// Faces whose box survived clamping and were anonymized.
    pub anonymized: usize,
    pub detect_ms: f64,
    pub anonymize_ms: f64,
}

/// Single-frame processing: detect → anonymize → annotate.
///
/// The caller's frame keeps its channel order; if the detector wants a
/// different one it is given a converted copy.
pub struct FramePipeline {
    detector: Box<dyn FaceDetector>,
    anonymizers: AnonymizerSet,
    annotator: Option<FaceAnnotator>,
    padding: f64,
}

impl FramePipeline {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        anonymizers: AnonymizerSet,
        settings: &AnonymizeSettings,
    ) -> Self {
        Self {
            detector,
            anonymizers,
            annotator: settings.annotate.then(FaceAnnotator::default),
            padding: settings.padding,
        }
    }

    pub fn set_annotate(&mut self, annotate: bool) {
        self.annotator = annotate.then(FaceAnnotator::default);
    }

    pub fn annotates(&self) -> bool {
        self.annotator.is_some()
    }

    pub fn run(
        &mut self,
        frame: &mut Frame,
        effect: EffectKind,
    ) -> Result<FrameOutcome, Box<dyn std::error::Error>> {
        let detect_start = Instant::now();
        let detections = {
            let input = frame.in_order(self.detector.channel_order());
            self.detector
                .detect(&input)
                .map_err(|source| AnonymizeError::DetectionFailure {
                    frame_index: frame.index(),
                    source,
                })?
        };
        let detect_ms = detect_start.elapsed().as_secs_f64() * 1000.0;

        let anonymize_start = Instant::now();
        let (w, h) = (frame.width(), frame.height());
        let mut anonymized = 0;
        let mut placed = Vec::with_capacity(detections.len());
        for bbox in &detections {
            let Some(rect) = PixelRect::from_bounding_box(bbox, w, h, self.padding) else {
                log::debug!("Skipping degenerate face box {bbox:?} on frame {}", frame.index());
                continue;
            };
            self.anonymizers.apply(frame, &rect, effect)?;
            anonymized += 1;
            placed.push((rect, bbox));
        }

        if let Some(annotator) = &self.annotator {
            for (rect, bbox) in &placed {
                annotator.annotate(frame, rect, bbox)?;
            }
        }
        let anonymize_ms = anonymize_start.elapsed().as_secs_f64() * 1000.0;

        Ok(FrameOutcome {
            detections,
            anonymized,
            detect_ms,
            anonymize_ms,
        })
    }
}
