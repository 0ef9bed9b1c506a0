#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{DynamicImage, ImageBuffer, Rgb};
use steelscan::{BoundingBox, DetectError, Detection, Detections, Detector};

/// 800x600-style RGB gradient, scaled to the requested size
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// Writes a gradient JPEG named `name` into `dir` and returns its path.
pub fn create_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient_image(width, height)
        .to_rgb8()
        .save_with_format(&path, image::ImageFormat::Jpeg)
        .expect("Failed to save test image");
    path
}

/// Shorthand for a detection
pub fn det(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_index: u32) -> Detection {
    Detection {
        bbox: BoundingBox::new(x1, y1, x2, y2),
        confidence,
        class_index,
    }
}

/// What a scripted detector saw on one call
#[derive(Debug, Clone)]
pub struct DetectCall {
    pub path: PathBuf,
    pub existed: bool,
}

/// Detector that returns a fixed answer and records the paths it was given
pub struct ScriptedDetector {
    detections: Detections,
    calls: Mutex<Vec<DetectCall>>,
}

impl ScriptedDetector {
    pub fn new(items: Vec<Detection>) -> Self {
        Self::with_detections(Detections::new(items))
    }

    pub fn with_detections(detections: Detections) -> Self {
        Self {
            detections,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<DetectCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Detector for ScriptedDetector {
    fn detect(&self, image_path: &Path) -> Result<Detections, DetectError> {
        self.calls.lock().unwrap().push(DetectCall {
            path: image_path.to_path_buf(),
            existed: image_path.exists(),
        });
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

/// Detector that always fails the way a missing weights file does
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image_path: &Path) -> Result<Detections, DetectError> {
        Err(DetectError::MissingWeights(PathBuf::from("best_mod.rten")))
    }

    fn name(&self) -> &str {
        "Failing"
    }
}
