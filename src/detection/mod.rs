pub mod annotate;
pub mod nms;
pub mod preprocessing;
pub mod yolo;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{DefectClass, Detections};

pub use yolo::YoloDetector;

/// Weights file looked up in the working directory unless overridden
pub const DEFAULT_MODEL_PATH: &str = "best_mod.rten";

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("model weights not found: {}", .0.display())]
    MissingWeights(PathBuf),
    #[error("failed to load model {}: {message}", path.display())]
    ModelLoad { path: PathBuf, message: String },
    #[error("failed to read image: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

/// Detector parameters
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    /// Side of the square model input
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    /// Class scores per anchor in the model head
    pub num_classes: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            num_classes: DefectClass::ALL.len(),
        }
    }
}

impl DetectorConfig {
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }
}

/// The object-detection collaborator.
///
/// Implementations read the image at `image_path` and return the defect
/// regions found in it, optionally with an overlay they rendered themselves.
pub trait Detector: Send + Sync {
    fn detect(&self, image_path: &Path) -> Result<Detections, DetectError>;

    /// Human-readable name (used in log output)
    fn name(&self) -> &str;
}
