use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use tempdir::TempDir;
use thiserror::Error;
use tracing::{debug, info};

use crate::detection::{DetectError, Detector};
use crate::report::{self, DetectionReport, ReportError};

/// Name of the working copy handed to the detector
const WORKING_FILE: &str = "temp_image.png";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("detection failed: {0}")]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to write working copy: {0}")]
    WorkingCopy(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one process action
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub report: DetectionReport,
    /// Where the annotated copy was written
    pub output_path: PathBuf,
}

/// One "process" action: detect, build the report, save the annotated copy
#[derive(Clone)]
pub struct Pipeline {
    detector: Arc<dyn Detector>,
}

impl Pipeline {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }

    /// Run detection on `image`, which was loaded from `source_path`.
    ///
    /// The image is handed to the detector through a working file in a
    /// fresh temporary directory. That directory is removed before this
    /// returns, whether or not detection succeeded.
    pub fn run(&self, source_path: &Path, image: &DynamicImage) -> Result<ProcessOutcome, ProcessError> {
        let working_dir = TempDir::new("steelscan")?;
        let working_file = working_dir.path().join(WORKING_FILE);
        image.save_with_format(&working_file, ImageFormat::Png)?;
        debug!("Wrote working copy: {}", working_file.display());

        info!(
            "Running {} detector on {}",
            self.detector.name(),
            source_path.display()
        );
        let started = Instant::now();
        let detections = self.detector.detect(&working_file)?;
        info!(
            "Detection finished in {:.2?}: {} defect(s)",
            started.elapsed(),
            detections.len()
        );

        working_dir.close()?;

        let report = report::build_report(image, &detections);
        let output_path = report::save_annotated(&report, source_path)?;

        Ok(ProcessOutcome {
            report,
            output_path,
        })
    }
}
