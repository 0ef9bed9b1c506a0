mod fixtures;
#[allow(unused_imports)]
pub use fixtures::*;

// Re-export commonly used types from steelscan for tests
#[allow(unused_imports)]
pub use steelscan::{
    BoundingBox, DetectError, Detection, Detections, Detector, Pipeline, ProcessError,
    build_report, format_line, result_path,
};
