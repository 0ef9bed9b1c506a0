pub mod detection;
pub mod models;
pub mod pipeline;
pub mod report;

pub use detection::{DetectError, Detector, DetectorConfig, YoloDetector};
pub use models::{BoundingBox, DefectClass, Detection, Detections};
pub use pipeline::{Pipeline, ProcessError, ProcessOutcome};
pub use report::{DetectionReport, ReportError, build_report, format_line, result_path};

#[cfg(feature = "gui")]
pub mod gui;
