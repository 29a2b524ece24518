use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the caller of a source run.
///
/// Effects that cannot be applied (an emoji without an overlay asset, a
/// face box that collapses after clamping) are not errors: the region is
/// left untouched and the run continues.
#[derive(Error, Debug)]
pub enum AnonymizeError {
    #[error("could not read {}: {reason}", path.display())]
    UnreadableInput { path: PathBuf, reason: String },

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("no frame could be read from {0}")]
    EmptyStream(String),

    #[error("face detection failed on frame {frame_index}: {source}")]
    DetectionFailure {
        frame_index: usize,
        source: Box<dyn std::error::Error>,
    },

    #[error("invalid overlay asset: {0}")]
    InvalidOverlay(String),
}

impl AnonymizeError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unreadable_message_names_path() {
        let err = AnonymizeError::unreadable("/tmp/missing.png", "no such file");
        assert_eq!(err.to_string(), "could not read /tmp/missing.png: no such file");
    }

    #[test]
    fn test_unsupported_message() {
        let err = AnonymizeError::UnsupportedFileType(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "unsupported file type: notes.txt");
    }

    #[test]
    fn test_detection_failure_keeps_source() {
        let err = AnonymizeError::DetectionFailure {
            frame_index: 3,
            source: "model exploded".into(),
        };
        assert!(err.to_string().contains("frame 3"));
        assert_eq!(err.source().unwrap().to_string(), "model exploded");
    }

    #[test]
    fn test_boxes_into_dyn_error() {
        let boxed: Box<dyn std::error::Error> =
            AnonymizeError::EmptyStream("camera /dev/video0".into()).into();
        assert!(boxed.downcast_ref::<AnonymizeError>().is_some());
    }
}
