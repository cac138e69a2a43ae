//! YOLOv8 object detection over ONNX Runtime.
//!
//! The bundled model is the general-purpose COCO YOLOv8n. Execution provider
//! selection:
//! - CUDA on Linux with NVIDIA GPU (`cuda` feature)
//! - CoreML on macOS
//! - CPU everywhere else

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{DynamicImage, ImageBuffer, Rgb};
use ndarray::ArrayView2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use super::classifier::{ClassScore, FrameClassifier};
use crate::error::{MediaError, MediaResult};
use crate::frames::Frame;

/// Default location of the YOLOv8n export.
pub const DEFAULT_MODEL_PATH: &str = "models/object_detection/yolov8n.onnx";

/// YOLOv8 head layout: 4 box coordinates followed by one score per class.
const NUM_CLASSES: usize = 80;
const NUM_FEATURES: usize = 4 + NUM_CLASSES;
const NUM_CANDIDATES: usize = 8400;

/// COCO class names (80 classes), indexed by class ID.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

/// Human-readable COCO name for a class ID.
pub fn class_name(class_id: usize) -> &'static str {
    COCO_CLASSES.get(class_id).copied().unwrap_or("unknown")
}

/// Detected object with a normalized bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDetection {
    /// Bounding box in normalized coordinates [0, 1]
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// COCO class ID
    pub class_id: usize,
    /// Detection confidence [0, 1]
    pub confidence: f32,
}

impl ObjectDetection {
    pub fn class_name(&self) -> &'static str {
        class_name(self.class_id)
    }
}

/// Configuration for object detection.
#[derive(Debug, Clone)]
pub struct ObjectDetectorConfig {
    /// Path to ONNX model file
    pub model_path: PathBuf,
    /// Candidates scoring below this are discarded before NMS
    pub candidate_threshold: f32,
    /// IoU threshold for NMS
    pub nms_threshold: f32,
    /// Square model input size
    pub input_size: u32,
}

impl Default for ObjectDetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            candidate_threshold: 0.25,
            nms_threshold: 0.45,
            input_size: 640,
        }
    }
}

impl ObjectDetectorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: std::env::var("VSCREEN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            candidate_threshold: std::env::var("VSCREEN_CANDIDATE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.candidate_threshold),
            ..defaults
        }
    }
}

/// YOLOv8 object detector.
pub struct ObjectDetector {
    session: Mutex<Session>,
    config: ObjectDetectorConfig,
}

impl ObjectDetector {
    /// Load the model. Fails if the model file is missing or cannot be loaded.
    pub fn new(config: ObjectDetectorConfig) -> MediaResult<Self> {
        if !config.model_path.exists() {
            return Err(MediaError::model_not_found(
                config.model_path.display().to_string(),
            ));
        }

        let session = Mutex::new(create_session(&config.model_path)?);
        info!(
            model_path = %config.model_path.display(),
            input_size = config.input_size,
            "Object detector initialized"
        );

        Ok(Self { session, config })
    }

    /// Detect objects in a packed RGB24 image.
    pub fn detect(&self, rgb: &[u8], width: u32, height: u32) -> MediaResult<Vec<ObjectDetection>> {
        let img = rgb_to_image(rgb, width, height)?;
        let input = self.preprocess(&img)?;
        let outputs = self.run_inference(input)?;
        let detections = self.postprocess(&outputs)?;

        debug!(count = detections.len(), "Object detection completed");
        Ok(detections)
    }

    /// Resize to the square input, scale to [0, 1] and lay out as NCHW.
    fn preprocess(&self, img: &DynamicImage) -> MediaResult<Value> {
        let size = self.config.input_size;
        let rgb = if img.width() == size && img.height() == size {
            img.to_rgb8()
        } else {
            img.resize_exact(size, size, image::imageops::FilterType::Triangle)
                .to_rgb8()
        };

        let side = size as usize;
        let plane = side * side;
        let mut nchw = vec![0f32; 3 * plane];
        for (i, pixel) in rgb.pixels().enumerate() {
            nchw[i] = pixel[0] as f32 / 255.0;
            nchw[plane + i] = pixel[1] as f32 / 255.0;
            nchw[2 * plane + i] = pixel[2] as f32 / 255.0;
        }

        Tensor::from_array((vec![1usize, 3, side, side], nchw.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| MediaError::detection_failed(format!("Failed to create tensor: {}", e)))
    }

    fn run_inference(&self, input: Value) -> MediaResult<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::detection_failed(format!("ONNX inference failed: {}", e)))?;

        // YOLOv8 output is [1, 84, 8400]
        let output = outputs
            .get("output0")
            .ok_or_else(|| MediaError::detection_failed("Missing output0 tensor"))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::detection_failed(format!("Failed to extract tensor: {}", e)))?;

        Ok(data.to_vec())
    }

    /// Decode the `[84, 8400]` head into detections and apply per-class NMS.
    fn postprocess(&self, outputs: &[f32]) -> MediaResult<Vec<ObjectDetection>> {
        let head = ArrayView2::from_shape((NUM_FEATURES, NUM_CANDIDATES), outputs).map_err(|e| {
            MediaError::detection_failed(format!(
                "Unexpected output size {} ({})",
                outputs.len(),
                e
            ))
        })?;

        // Boxes are in input-pixel space
        let input_size = self.config.input_size as f32;

        let mut candidates = Vec::new();
        for i in 0..NUM_CANDIDATES {
            let (class_id, score) = (0..NUM_CLASSES)
                .map(|c| (c, head[[4 + c, i]]))
                .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });

            if score < self.config.candidate_threshold {
                continue;
            }

            let (cx, cy, w, h) = (head[[0, i]], head[[1, i]], head[[2, i]], head[[3, i]]);
            let x = ((cx - w / 2.0) / input_size).clamp(0.0, 1.0);
            let y = ((cy - h / 2.0) / input_size).clamp(0.0, 1.0);

            candidates.push(ObjectDetection {
                x,
                y,
                width: (w / input_size).min(1.0 - x),
                height: (h / input_size).min(1.0 - y),
                class_id,
                confidence: score,
            });
        }

        Ok(non_maximum_suppression(candidates, self.config.nms_threshold))
    }
}

impl FrameClassifier for ObjectDetector {
    fn classify(&self, frame: &Frame) -> MediaResult<Vec<ClassScore>> {
        Ok(self
            .detect(&frame.rgb, frame.width, frame.height)?
            .into_iter()
            .map(|d| ClassScore::new(d.class_id, d.confidence))
            .collect())
    }

    fn name(&self) -> &'static str {
        "yolov8"
    }
}

fn rgb_to_image(rgb: &[u8], width: u32, height: u32) -> MediaResult<DynamicImage> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(MediaError::detection_failed(format!(
            "Invalid frame length: expected {}, got {}",
            expected,
            rgb.len()
        )));
    }

    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, rgb.to_vec())
        .ok_or_else(|| MediaError::internal("Failed to create image buffer"))?;

    Ok(DynamicImage::ImageRgb8(buffer))
}

/// Keep the most confident box of each overlapping same-class cluster.
fn non_maximum_suppression(mut detections: Vec<ObjectDetection>, iou_threshold: f32) -> Vec<ObjectDetection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<ObjectDetection> = Vec::new();
    for candidate in detections {
        let overlaps = keep
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !overlaps {
            keep.push(candidate);
        }
    }
    keep
}

/// Intersection over union of two normalized boxes.
fn iou(a: &ObjectDetection, b: &ObjectDetection) -> f32 {
    let inter_w = ((a.x + a.width).min(b.x + b.width) - a.x.max(b.x)).max(0.0);
    let inter_h = ((a.y + a.height).min(b.y + b.height) - a.y.max(b.y)).max(0.0);
    let intersection = inter_w * inter_h;
    let union = a.width * a.height + b.width * b.height - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Create an ONNX Runtime session, preferring hardware execution providers.
fn create_session(model_path: &Path) -> MediaResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| MediaError::internal(format!("Failed to read model file: {}", e)))?;

    let builder = Session::builder()
        .map_err(|e| MediaError::internal(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| MediaError::internal(format!("Failed to set optimization level: {}", e)))?;

    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider for object detection");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, trying alternatives");
    }

    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!("Using CoreML execution provider for object detection");
                return Ok(session);
            }
        }
        debug!("CoreML execution provider not available, using CPU");
    }

    info!("Using CPU execution provider for object detection");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| MediaError::model_not_found(format!("Failed to load ONNX model: {}", e)))
}

/// Check if a model file exists at `path`.
pub fn is_model_available_at(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}
