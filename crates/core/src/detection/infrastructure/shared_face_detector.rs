use std::sync::{Arc, Mutex};

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::{ChannelOrder, Frame};

/// A cloneable handle to one detector shared between callers.
///
/// Every clone serializes `detect` through the same lock, so a single loaded
/// model can serve several pipelines or worker threads.
#[derive(Clone)]
pub struct SharedFaceDetector {
    inner: Arc<Mutex<Box<dyn FaceDetector>>>,
    order: ChannelOrder,
}

impl SharedFaceDetector {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        let order = detector.channel_order();
        Self {
            inner: Arc::new(Mutex::new(detector)),
            order,
        }
    }
}

impl FaceDetector for SharedFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let mut detector = self
            .inner
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        detector.detect(frame)
    }

    fn channel_order(&self) -> ChannelOrder {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct CountingDetector {
        calls: Arc<Mutex<usize>>,
    }

    impl FaceDetector for CountingDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            Ok(vec![BoundingBox::new(0.1, 0.1, 0.2, 0.2, 0.9)])
        }

        fn channel_order(&self) -> ChannelOrder {
            ChannelOrder::Bgr
        }
    }

    #[test]
    fn test_clones_share_one_detector() {
        let calls = Arc::new(Mutex::new(0));
        let shared = SharedFaceDetector::new(Box::new(CountingDetector {
            calls: calls.clone(),
        }));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut detector = shared.clone();
                thread::spawn(move || {
                    let frame = Frame::filled(8, 8, 3, 0);
                    detector.detect(&frame).unwrap().len()
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[test]
    fn test_reports_inner_channel_order() {
        let shared = SharedFaceDetector::new(Box::new(CountingDetector {
            calls: Arc::new(Mutex::new(0)),
        }));
        assert_eq!(shared.channel_order(), ChannelOrder::Bgr);
    }
}
