//! Object detection for prohibited-item screening.
//!
//! | Piece | Role |
//! |-------|------|
//! | `FrameClassifier` | Pluggable per-frame contract: frame in, `(class, confidence)` pairs out |
//! | `ObjectDetector` | YOLOv8 (COCO) implementation over ONNX Runtime |
//! | `PresenceDetector` | Samples frames and folds classifier output into a `PresenceSummary` |

pub mod classifier;
pub mod object_detector;
pub mod presence;

pub use classifier::{ClassScore, FrameClassifier};
pub use object_detector::{
    class_name, is_model_available_at, ObjectDetection, ObjectDetector, ObjectDetectorConfig,
    COCO_CLASSES, DEFAULT_MODEL_PATH,
};
pub use presence::{PresenceAccumulator, PresenceConfig, PresenceDetector, DEFAULT_TARGET_CLASSES};
