use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use image::ImageReader;
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use tracing::{debug, info};

use super::annotate::plot_detections;
use super::nms::non_max_suppression;
use super::preprocessing::{Letterbox, letterbox_image, to_nchw_tensor};
use super::{DetectError, Detector, DetectorConfig};
use crate::models::{Detection, Detections};

/// Number of box attributes ahead of the class scores (cx, cy, w, h)
const BOX_ATTRS: usize = 4;

/// YOLOv8-style detector running on the rten runtime.
///
/// The weights are loaded on first use and kept for the lifetime of the
/// detector.
pub struct YoloDetector {
    config: DetectorConfig,
    model: Mutex<Option<Arc<Model>>>,
}

impl YoloDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            model: Mutex::new(None),
        }
    }

    fn model(&self) -> Result<Arc<Model>, DetectError> {
        let mut slot = self.model.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(model) = slot.as_ref() {
            return Ok(model.clone());
        }

        let path = &self.config.model_path;
        if !path.exists() {
            return Err(DetectError::MissingWeights(path.clone()));
        }

        info!("Loading detection model: {}", path.display());
        let model = Model::load_file(path).map_err(|e| DetectError::ModelLoad {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let model = Arc::new(model);
        *slot = Some(model.clone());

        Ok(model)
    }

    fn infer(&self, model: &Model, input: NdTensor<f32, 4>) -> Result<NdTensor<f32, 3>, DetectError> {
        let output = model
            .run_one(input.view().into(), None)
            .map_err(|e| DetectError::Inference(e.to_string()))?;

        NdTensor::<f32, 3>::try_from(output)
            .map_err(|e| DetectError::UnexpectedOutput(e.to_string()))
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image_path: &Path) -> Result<Detections, DetectError> {
        let model = self.model()?;

        let img = ImageReader::open(image_path)?.with_guessed_format()?.decode()?;
        debug!("Image loaded: {}x{}", img.width(), img.height());

        let (canvas, letterbox) = letterbox_image(&img, self.config.input_size);
        let input = to_nchw_tensor(&canvas);

        let started = Instant::now();
        let output = self.infer(&model, input)?;
        debug!("Inference took {:.2?}", started.elapsed());

        let shape = output.shape();
        let data = output.to_vec();
        let items = decode_predictions(&data, shape, &letterbox, &self.config)?;

        info!("{} defect(s) detected in {}", items.len(), image_path.display());
        if items.is_empty() {
            return Ok(Detections::new(items));
        }

        let overlay = plot_detections(&img, &items);
        Ok(Detections::new(items).with_overlay(overlay))
    }

    fn name(&self) -> &str {
        "YOLO"
    }
}

/// Decode a raw YOLOv8 head into detections in source-image pixels.
///
/// Accepts both `[1, 4 + classes, anchors]` and `[1, anchors, 4 + classes]`.
/// The attribute axis is the one sized `4 + config.num_classes`; when neither
/// matches, the smaller trailing dimension is taken.
pub fn decode_predictions(
    data: &[f32],
    shape: [usize; 3],
    letterbox: &Letterbox,
    config: &DetectorConfig,
) -> Result<Vec<Detection>, DetectError> {
    let [batch, dim_a, dim_b] = shape;
    if batch != 1 {
        return Err(DetectError::UnexpectedOutput(format!(
            "expected batch size 1, got {}",
            batch
        )));
    }
    if data.len() != dim_a * dim_b {
        return Err(DetectError::UnexpectedOutput(format!(
            "output holds {} values, shape {:?} needs {}",
            data.len(),
            shape,
            dim_a * dim_b
        )));
    }

    let expected = BOX_ATTRS + config.num_classes;
    let attrs_first = match (dim_a == expected, dim_b == expected) {
        (true, _) => true,
        (false, true) => false,
        (false, false) => dim_a <= dim_b,
    };
    let (attrs, anchors) = if attrs_first { (dim_a, dim_b) } else { (dim_b, dim_a) };
    if attrs <= BOX_ATTRS {
        return Err(DetectError::UnexpectedOutput(format!(
            "output shape {:?} has no class scores",
            shape
        )));
    }

    let at = |attr: usize, anchor: usize| {
        if attrs_first {
            data[attr * anchors + anchor]
        } else {
            data[anchor * attrs + attr]
        }
    };

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let (class_index, score) = (BOX_ATTRS..attrs)
            .map(|attr| (attr - BOX_ATTRS, at(attr, anchor)))
            .fold((0, f32::NEG_INFINITY), |best, next| {
                if next.1 > best.1 { next } else { best }
            });

        if !score.is_finite() || score < config.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, anchor), at(1, anchor), at(2, anchor), at(3, anchor));
        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        let bbox = letterbox.to_source(cx, cy, w, h);
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            continue;
        }

        candidates.push(Detection {
            bbox,
            confidence: score.clamp(0.0, 1.0),
            class_index: class_index as u32,
        });
    }

    debug!("{} candidates before NMS", candidates.len());
    Ok(non_max_suppression(
        candidates,
        config.iou_threshold,
        config.max_detections,
    ))
}
