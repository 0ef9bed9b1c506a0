//! Detection report builder.
//!
//! Turns a detector's output into the two things the user sees: an annotated
//! copy of the image and one line of text per detected defect.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgba};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Detection, Detections};

/// Suffix appended to the input's file stem for the saved artifact
pub const RESULT_SUFFIX: &str = "_result";
pub const RESULT_EXTENSION: &str = "jpg";

/// Field labels of a report line
pub const COORDINATES_LABEL: &str = "Координаты";
pub const CLASS_LABEL: &str = "Класс дефекта";
pub const CONFIDENCE_LABEL: &str = "Вероятность";

const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BOX_THICKNESS: u32 = 2;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot derive a result path from {}", .0.display())]
    InvalidSourcePath(PathBuf),
    #[error("failed to save annotated image to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Annotated image plus one text line per detection
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub annotated: DynamicImage,
    pub lines: Vec<String>,
}

impl DetectionReport {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Report text as shown in the UI, one line per detection
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}\n", line))
            .collect()
    }
}

/// Format a single detection
pub fn format_line(detection: &Detection) -> String {
    let b = &detection.bbox;
    format!(
        "{}: ({:.2}, {:.2}), ({:.2}, {:.2}) // {}: {} // {}: {:.2}",
        COORDINATES_LABEL,
        b.x1,
        b.y1,
        b.x2,
        b.y2,
        CLASS_LABEL,
        detection.class_name(),
        CONFIDENCE_LABEL,
        detection.confidence
    )
}

/// Build the report for `image`.
///
/// With no detections the input comes back untouched; otherwise boxes are
/// drawn on the detector's overlay if it supplied one, else on a copy of
/// the input.
pub fn build_report(image: &DynamicImage, detections: &Detections) -> DetectionReport {
    if detections.is_empty() {
        debug!("No detections, returning the input unchanged");
        return DetectionReport {
            annotated: image.clone(),
            lines: Vec::new(),
        };
    }

    let base = detections.overlay.as_ref().unwrap_or(image);
    let mut canvas = base.to_rgba8();

    let lines = detections
        .items
        .iter()
        .map(|detection| {
            draw_box(&mut canvas, detection);
            format_line(detection)
        })
        .collect();

    DetectionReport {
        annotated: DynamicImage::ImageRgba8(canvas),
        lines,
    }
}

fn draw_box(canvas: &mut image::RgbaImage, detection: &Detection) {
    let (width, height) = canvas.dimensions();
    let bbox = detection
        .bbox
        .clamp_to(width.saturating_sub(1), height.saturating_sub(1));

    // Integer corners, truncated like the pixel grid the detector reports on
    let x1 = bbox.x1 as i32;
    let y1 = bbox.y1 as i32;
    let x2 = bbox.x2 as i32;
    let y2 = bbox.y2 as i32;

    for t in 0..BOX_THICKNESS as i32 {
        let w = x2 - x1 + 1 - 2 * t;
        let h = y2 - y1 + 1 - 2 * t;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
    }
}

/// `<dir>/<stem>_result.jpg` for a source image at `<dir>/<stem>.<ext>`
pub fn result_path(source: &Path) -> Result<PathBuf, ReportError> {
    let stem = source
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ReportError::InvalidSourcePath(source.to_path_buf()))?;

    let mut file_name = stem.to_os_string();
    file_name.push(RESULT_SUFFIX);
    file_name.push(".");
    file_name.push(RESULT_EXTENSION);

    Ok(source.with_file_name(file_name))
}

/// Write the annotated image beside `source` and return where it went
pub fn save_annotated(report: &DetectionReport, source: &Path) -> Result<PathBuf, ReportError> {
    let path = result_path(source)?;

    // JPEG has no alpha channel
    report
        .annotated
        .to_rgb8()
        .save_with_format(&path, ImageFormat::Jpeg)
        .map_err(|err| ReportError::Save {
            path: path.clone(),
            source: err,
        })?;

    info!("Saved annotated image: {}", path.display());
    Ok(path)
}
